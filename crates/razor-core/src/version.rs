//! Per-document version tracking for response staleness detection.
//!
//! The cache is owned by the single-writer document store and is never
//! shared, so it carries no synchronisation of its own.

use std::collections::{HashMap, VecDeque};

use tower_lsp_server::ls_types::Uri;

use crate::document::{HostDocumentSnapshot, SnapshotId};
use crate::error::{RazorError, Result};

/// Version stamp for documents that are unknown or closed at query time.
pub const UNDEFINED_VERSION: i32 = -1;

/// Number of snapshots remembered per document by default.
pub const DEFAULT_VERSION_HISTORY: usize = 20;

/// Maps document snapshots to the host version they were taken at.
///
/// Each open document keeps a bounded history of its most recent
/// snapshots, so a request that resolved a snapshot just before an edit
/// still gets that snapshot's own version. Closing a document forgets all
/// of its snapshots.
///
/// # Examples
///
/// ```
/// use razor_core::document::HostDocumentSnapshot;
/// use razor_core::version::DocumentVersionCache;
/// use tower_lsp_server::ls_types::Uri;
///
/// let uri = Uri::from_file_path("/Index.razor").unwrap();
/// let snapshot = HostDocumentSnapshot::new(uri.clone(), "".into(), 3);
///
/// let mut cache = DocumentVersionCache::default();
/// cache.track(&snapshot).unwrap();
/// assert_eq!(cache.try_get_version(&snapshot), Some(3));
///
/// cache.untrack(&uri);
/// assert_eq!(cache.try_get_version(&snapshot), None);
/// ```
#[derive(Debug)]
pub struct DocumentVersionCache {
    entries: HashMap<Uri, VecDeque<(SnapshotId, i32)>>,
    history: usize,
}

impl DocumentVersionCache {
    pub fn new(history: usize) -> Self {
        Self {
            entries: HashMap::new(),
            history: history.max(1),
        }
    }

    /// Changes the history depth, trimming documents that already hold
    /// more snapshots than the new depth allows.
    pub fn set_history(&mut self, history: usize) {
        self.history = history.max(1);
        for snapshots in self.entries.values_mut() {
            while snapshots.len() > self.history {
                snapshots.pop_front();
            }
        }
    }

    pub const fn history(&self) -> usize {
        self.history
    }

    /// Records the version of a new snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RazorError::StaleVersion`] if the snapshot's version is not
    /// greater than the latest version tracked for the same document.
    pub fn track(&mut self, snapshot: &HostDocumentSnapshot) -> Result<()> {
        let history = self.entries.entry(snapshot.uri().clone()).or_default();

        if let Some(&(_, latest)) = history.back()
            && snapshot.version() <= latest
        {
            return Err(RazorError::StaleVersion {
                uri: snapshot.uri().as_str().to_string(),
                current: latest,
                received: snapshot.version(),
            });
        }

        history.push_back((snapshot.id(), snapshot.version()));
        while history.len() > self.history {
            history.pop_front();
        }
        Ok(())
    }

    /// Looks up the version of `snapshot`.
    ///
    /// `None` means the document was closed, never opened, or the snapshot
    /// fell out of the history window. Callers report that as
    /// [`UNDEFINED_VERSION`], never as version zero.
    pub fn try_get_version(&self, snapshot: &HostDocumentSnapshot) -> Option<i32> {
        self.entries
            .get(snapshot.uri())?
            .iter()
            .rev()
            .find(|(id, _)| *id == snapshot.id())
            .map(|&(_, version)| version)
    }

    pub fn latest_version(&self, uri: &Uri) -> Option<i32> {
        self.entries
            .get(uri)
            .and_then(|history| history.back())
            .map(|&(_, version)| version)
    }

    /// Forgets every snapshot of `uri`. Returns whether anything was tracked.
    pub fn untrack(&mut self, uri: &Uri) -> bool {
        self.entries.remove(uri).is_some()
    }

    pub fn tracked_documents(&self) -> usize {
        self.entries.len()
    }
}

impl Default for DocumentVersionCache {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION_HISTORY)
    }
}
