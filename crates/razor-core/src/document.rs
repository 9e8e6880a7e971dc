use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tower_lsp_server::ls_types::Uri;

/// Process-unique identity of one host document snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotId(u64);

impl SnapshotId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Immutable view of a host document at one version.
///
/// Snapshots are created by the document store whenever the host text
/// changes. Cloning is cheap: the text is shared.
///
/// # Examples
///
/// ```
/// use razor_core::document::HostDocumentSnapshot;
/// use tower_lsp_server::ls_types::Uri;
///
/// let uri = Uri::from_file_path("/Index.razor").unwrap();
/// let first = HostDocumentSnapshot::new(uri.clone(), "<p>@x</p>".into(), 1);
/// let second = HostDocumentSnapshot::new(uri, "<p>@y</p>".into(), 2);
///
/// assert_ne!(first.id(), second.id());
/// assert_eq!(second.version(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct HostDocumentSnapshot {
    id: SnapshotId,
    uri: Uri,
    text: Arc<str>,
    version: i32,
}

impl HostDocumentSnapshot {
    pub fn new(uri: Uri, text: Arc<str>, version: i32) -> Self {
        Self {
            id: SnapshotId::next(),
            uri,
            text,
            version,
        }
    }

    pub const fn id(&self) -> SnapshotId {
        self.id
    }

    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn text(&self) -> &Arc<str> {
        &self.text
    }

    /// Host version this snapshot was taken at.
    pub const fn version(&self) -> i32 {
        self.version
    }
}
