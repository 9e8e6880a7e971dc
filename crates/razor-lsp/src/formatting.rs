//! Formatting delegated to the editor.
//!
//! The server has no C# formatter of its own. It sends projected edits to
//! the client with `razor/formatProjectedEdits` and maps whatever comes
//! back.

use async_trait::async_trait;
use razor_core::{Formatter, GeneratedDocument, LanguageKind, RazorError, Result};
use tower_lsp_server::Client;
use tower_lsp_server::ls_types::{FormattingOptions, TextEdit};

use crate::protocol::{FormatProjectedEdits, FormatProjectedEditsParams};

pub struct ClientFormatter {
    client: Client,
}

impl ClientFormatter {
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Formatter for ClientFormatter {
    async fn format(
        &self,
        doc: &GeneratedDocument,
        kind: LanguageKind,
        edits: Vec<TextEdit>,
        options: &FormattingOptions,
    ) -> Result<Vec<TextEdit>> {
        let params = FormatProjectedEditsParams {
            razor_document_uri: doc.uri().clone(),
            host_document_version: doc.host_version(),
            kind,
            projected_edits: edits,
            options: options.clone(),
        };

        self.client
            .send_request::<FormatProjectedEdits>(params)
            .await
            .map_err(|e| RazorError::Formatting {
                source: Box::new(e),
            })
    }
}
