//! Projection of ranges and edits from a projected document back into the
//! host document.
//!
//! Ranges and edits produced against a projected document are only
//! meaningful to the client once re-expressed in host coordinates. Html
//! projections share host coordinates and pass through untouched. C#
//! projections go through the source mappings, item by item.

use std::sync::Arc;

use async_trait::async_trait;
use tower_lsp_server::ls_types::{FormattingOptions, Range, TextEdit};
use tracing::{debug, trace};

use crate::classify::LanguageKind;
use crate::error::Result;
use crate::generated::GeneratedDocument;
use crate::position;

/// Maps each projected range to a host range.
///
/// The output has the same length and order as the input. Ranges that fail
/// to map become `None` at the same index, so a caller can still tell which
/// input each answer belongs to.
pub fn map_ranges(doc: &GeneratedDocument, kind: LanguageKind, ranges: &[Range]) -> Vec<Option<Range>> {
    if kind != LanguageKind::CSharp {
        return ranges.iter().copied().map(Some).collect();
    }

    ranges
        .iter()
        .map(|&range| {
            let mapped = position::try_map_from_projected(doc, range);
            if mapped.is_none() {
                trace!(?range, "projected range has no host counterpart");
            }
            mapped
        })
        .collect()
}

/// Maps projected edits into the host document, dropping edits whose range
/// cannot be mapped. Non-C# edits pass through unchanged.
pub fn map_edits(doc: &GeneratedDocument, kind: LanguageKind, edits: Vec<TextEdit>) -> Vec<TextEdit> {
    if kind != LanguageKind::CSharp {
        return edits;
    }

    let total = edits.len();
    let mapped: Vec<_> = edits
        .into_iter()
        .filter_map(|edit| {
            position::try_map_from_projected(doc, edit.range)
                .map(|range| TextEdit::new(range, edit.new_text))
        })
        .collect();

    if mapped.len() < total {
        debug!(
            dropped = total - mapped.len(),
            total, "dropped projected edits without host mapping"
        );
    }
    mapped
}

/// Formats projected edits before they are mapped back to the host.
///
/// Implementations receive and return edits in projected coordinates.
#[async_trait]
pub trait Formatter: Send + Sync {
    async fn format(
        &self,
        doc: &GeneratedDocument,
        kind: LanguageKind,
        edits: Vec<TextEdit>,
        options: &FormattingOptions,
    ) -> Result<Vec<TextEdit>>;
}

/// Formats (optionally) and maps projected edits.
///
/// # Examples
///
/// ```no_run
/// # use std::sync::Arc;
/// # use razor_core::classify::LanguageKind;
/// # use razor_core::generated::GeneratedDocument;
/// # use razor_core::projection::{EditProjector, Formatter};
/// # use tower_lsp_server::ls_types::{FormattingOptions, TextEdit};
/// # async fn demo(formatter: Arc<dyn Formatter>, doc: &GeneratedDocument, edits: Vec<TextEdit>) {
/// let projector = EditProjector::new(formatter);
/// let host_edits = projector
///     .map_edits(doc, LanguageKind::CSharp, edits, true, &FormattingOptions::default())
///     .await
///     .unwrap();
/// # }
/// ```
#[derive(Clone)]
pub struct EditProjector {
    formatter: Arc<dyn Formatter>,
}

impl EditProjector {
    pub fn new(formatter: Arc<dyn Formatter>) -> Self {
        Self { formatter }
    }

    /// Maps `edits` into the host, formatting them first when
    /// `should_format` is set.
    ///
    /// # Errors
    ///
    /// Propagates formatter failures. Mapping itself never fails.
    pub async fn map_edits(
        &self,
        doc: &GeneratedDocument,
        kind: LanguageKind,
        edits: Vec<TextEdit>,
        should_format: bool,
        options: &FormattingOptions,
    ) -> Result<Vec<TextEdit>> {
        let edits = if should_format {
            self.formatter.format(doc, kind, edits, options).await?
        } else {
            edits
        };
        Ok(map_edits(doc, kind, edits))
    }
}

impl std::fmt::Debug for EditProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditProjector").finish_non_exhaustive()
    }
}
