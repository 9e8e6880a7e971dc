//! Generated documents built from output published by the Razor compiler.
//!
//! The compiler runs outside this server and pushes its output for each
//! host version through `razor/updateGeneratedOutput`. Only the newest
//! publication per document is kept.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use razor_core::{
    DocumentGenerator, GeneratedDocument, GeneratedOutput, HostDocumentSnapshot, RazorError,
    Result,
};
use tower_lsp_server::ls_types::Uri;

#[derive(Debug, Default)]
pub struct PublishedOutputGenerator {
    outputs: DashMap<Uri, (i32, GeneratedOutput)>,
}

impl PublishedOutputGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores compiler output for `version` of `uri`.
    ///
    /// Returns `false` and keeps the stored output when a newer version was
    /// already published.
    pub fn publish(&self, uri: Uri, version: i32, output: GeneratedOutput) -> bool {
        match self.outputs.entry(uri) {
            Entry::Occupied(entry) if entry.get().0 > version => {
                tracing::debug!(
                    "ignoring output v{} for {:?}, already have v{}",
                    version,
                    entry.key(),
                    entry.get().0
                );
                false
            }
            Entry::Occupied(mut entry) => {
                entry.insert((version, output));
                true
            }
            Entry::Vacant(entry) => {
                entry.insert((version, output));
                true
            }
        }
    }

    pub fn forget(&self, uri: &Uri) {
        self.outputs.remove(uri);
    }

    pub fn published_version(&self, uri: &Uri) -> Option<i32> {
        self.outputs.get(uri).map(|entry| entry.0)
    }
}

impl DocumentGenerator for PublishedOutputGenerator {
    fn generate(&self, snapshot: &HostDocumentSnapshot) -> Result<GeneratedDocument> {
        let unavailable = || RazorError::GeneratedOutputUnavailable {
            uri: snapshot.uri().as_str().to_string(),
            version: snapshot.version(),
        };

        let entry = self.outputs.get(snapshot.uri()).ok_or_else(unavailable)?;
        let (version, output) = entry.value();
        if *version != snapshot.version() {
            return Err(unavailable());
        }
        GeneratedDocument::new(snapshot, output.clone())
    }
}
