use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use razor_core::{DocumentGenerator, GeneratedDocument, HostDocumentSnapshot, SnapshotId};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tower_lsp_server::ls_types::Uri;

use super::store::DocumentChanged;

/// One generated document per open host document, at its newest snapshot.
///
/// A generated document is computed at most once per snapshot, and the
/// store takes exactly one snapshot per (document, version). Generation runs
/// under the map's entry lock, so concurrent requests for the same snapshot
/// wait for the first one instead of generating again. Entries are replaced
/// wholesale, never mutated, and a request holding an older snapshot never
/// displaces a newer entry. Snapshot ids decide age, so a document reopened
/// at a lower version still counts as newer.
#[derive(Debug, Default)]
pub struct GeneratedDocumentCache {
    entries: DashMap<Uri, Arc<GeneratedDocument>>,
}

impl GeneratedDocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the generated document for `snapshot`, generating it on a
    /// miss. Generator failures yield an unsupported document.
    pub fn get_or_generate(
        &self,
        snapshot: &HostDocumentSnapshot,
        generator: &dyn DocumentGenerator,
    ) -> Arc<GeneratedDocument> {
        match self.entries.entry(snapshot.uri().clone()) {
            Entry::Occupied(mut entry) => {
                let cached = entry.get().snapshot_id();
                if cached == snapshot.id() {
                    tracing::trace!("generated document cache hit: {:?}", snapshot.uri());
                    return Arc::clone(entry.get());
                }
                let doc = Arc::new(generate(snapshot, generator));
                if cached < snapshot.id() {
                    entry.insert(Arc::clone(&doc));
                } else {
                    tracing::debug!(
                        "not caching version {} over newer version {}",
                        snapshot.version(),
                        entry.get().host_version()
                    );
                }
                doc
            }
            Entry::Vacant(entry) => {
                let doc = Arc::new(generate(snapshot, generator));
                entry.insert(Arc::clone(&doc));
                doc
            }
        }
    }

    pub fn invalidate(&self, uri: &Uri) -> bool {
        self.entries.remove(uri).is_some()
    }

    /// Drops the entry for `uri` only if it was generated from a snapshot
    /// older than `snapshot`.
    pub fn invalidate_older_than(&self, uri: &Uri, snapshot: SnapshotId) -> bool {
        self.entries
            .remove_if(uri, |_, doc| doc.snapshot_id() < snapshot)
            .is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops entries as host documents change.
    ///
    /// Events can arrive after a request already cached the snapshot they
    /// announce; such entries are kept. A close always drops the entry. A
    /// lagged subscriber cannot know which documents it missed, so it drops
    /// everything.
    pub fn watch(self: Arc<Self>, mut events: broadcast::Receiver<DocumentChanged>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let removed = match event.snapshot {
                            Some(snapshot) => self.invalidate_older_than(&event.uri, snapshot),
                            None => self.invalidate(&event.uri),
                        };
                        if removed {
                            tracing::trace!("invalidated generated document: {:?}", event.uri);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("missed {} document events, clearing cache", skipped);
                        self.clear();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

fn generate(snapshot: &HostDocumentSnapshot, generator: &dyn DocumentGenerator) -> GeneratedDocument {
    generator.generate(snapshot).unwrap_or_else(|e| {
        tracing::debug!(
            "generation failed for {:?} v{}: {}",
            snapshot.uri(),
            snapshot.version(),
            e
        );
        GeneratedDocument::unsupported(snapshot)
    })
}
