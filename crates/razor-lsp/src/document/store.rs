//! Single-writer host document store.
//!
//! All host document state lives inside one actor task. Handlers talk to it
//! through [`DocumentStoreHandle`], which sends a command and awaits the
//! reply on a oneshot channel. Every snapshot and version read is therefore
//! serialised with every edit, without locks around document state.

use std::collections::HashMap;

use razor_core::{DocumentVersionCache, HostDocumentSnapshot, RazorError, Result, SnapshotId};
use tokio::sync::{broadcast, mpsc, oneshot};
use tower_lsp_server::ls_types::Uri;

/// Command channel capacity.
const COMMAND_BUFFER: usize = 256;

/// Change event channel capacity. Slow subscribers past this lag and must
/// resynchronise.
const EVENT_BUFFER: usize = 64;

/// Broadcast whenever a host document is opened, edited or closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChanged {
    pub uri: Uri,
    /// New host version, `None` on close.
    pub version: Option<i32>,
    /// Snapshot holding the new text, `None` on close. Snapshot ids grow
    /// across reopens, so they order events where versions cannot.
    pub snapshot: Option<SnapshotId>,
}

/// Commands for the document store actor.
#[derive(Debug)]
pub enum StoreCommand {
    Open {
        uri: Uri,
        text: String,
        version: i32,
        reply: oneshot::Sender<Result<()>>,
    },
    Change {
        uri: Uri,
        text: String,
        version: i32,
        reply: oneshot::Sender<Result<()>>,
    },
    Close {
        uri: Uri,
        reply: oneshot::Sender<bool>,
    },
    /// Latest snapshot of an open document.
    Snapshot {
        uri: Uri,
        reply: oneshot::Sender<Option<HostDocumentSnapshot>>,
    },
    /// Host version of a previously resolved snapshot.
    Version {
        snapshot: HostDocumentSnapshot,
        reply: oneshot::Sender<Option<i32>>,
    },
    SetVersionHistory {
        history: usize,
    },
}

/// Handle for communicating with the [`DocumentStore`].
#[derive(Clone, Debug)]
pub struct DocumentStoreHandle {
    tx: mpsc::Sender<StoreCommand>,
    events: broadcast::Sender<DocumentChanged>,
}

impl DocumentStoreHandle {
    async fn request<T>(&self, command: StoreCommand, rx: oneshot::Receiver<T>) -> Result<T> {
        self.tx
            .send(command)
            .await
            .map_err(|_| RazorError::StoreClosed)?;
        rx.await.map_err(|_| RazorError::StoreClosed)
    }

    /// Opens (or reopens) a document.
    pub async fn open(&self, uri: Uri, text: String, version: i32) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.request(
            StoreCommand::Open {
                uri,
                text,
                version,
                reply,
            },
            rx,
        )
        .await?
    }

    /// Replaces the text of an open document.
    ///
    /// # Errors
    ///
    /// [`RazorError::DocumentNotOpen`] for unknown documents and
    /// [`RazorError::StaleVersion`] when `version` does not advance.
    pub async fn change(&self, uri: Uri, text: String, version: i32) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.request(
            StoreCommand::Change {
                uri,
                text,
                version,
                reply,
            },
            rx,
        )
        .await?
    }

    /// Closes a document. Returns whether it was open.
    pub async fn close(&self, uri: Uri) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.request(StoreCommand::Close { uri, reply }, rx).await
    }

    pub async fn snapshot(&self, uri: Uri) -> Result<Option<HostDocumentSnapshot>> {
        let (reply, rx) = oneshot::channel();
        self.request(StoreCommand::Snapshot { uri, reply }, rx).await
    }

    pub async fn version(&self, snapshot: HostDocumentSnapshot) -> Result<Option<i32>> {
        let (reply, rx) = oneshot::channel();
        self.request(StoreCommand::Version { snapshot, reply }, rx)
            .await
    }

    pub async fn set_version_history(&self, history: usize) -> Result<()> {
        self.tx
            .send(StoreCommand::SetVersionHistory { history })
            .await
            .map_err(|_| RazorError::StoreClosed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DocumentChanged> {
        self.events.subscribe()
    }
}

/// Actor owning every open host document and the version cache.
pub struct DocumentStore {
    rx: mpsc::Receiver<StoreCommand>,
    events: broadcast::Sender<DocumentChanged>,
    documents: HashMap<Uri, HostDocumentSnapshot>,
    versions: DocumentVersionCache,
}

impl DocumentStore {
    /// Spawns the store on the current runtime.
    pub fn start(version_history: usize) -> DocumentStoreHandle {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let store = Self {
            rx,
            events: events.clone(),
            documents: HashMap::new(),
            versions: DocumentVersionCache::new(version_history),
        };
        tokio::spawn(store.run());
        DocumentStoreHandle { tx, events }
    }

    async fn run(mut self) {
        while let Some(cmd) = self.rx.recv().await {
            match cmd {
                StoreCommand::Open {
                    uri,
                    text,
                    version,
                    reply,
                } => {
                    let res = self.handle_open(uri, text, version);
                    let _ = reply.send(res);
                }
                StoreCommand::Change {
                    uri,
                    text,
                    version,
                    reply,
                } => {
                    let res = self.handle_change(uri, text, version);
                    let _ = reply.send(res);
                }
                StoreCommand::Close { uri, reply } => {
                    let _ = reply.send(self.handle_close(uri));
                }
                StoreCommand::Snapshot { uri, reply } => {
                    let _ = reply.send(self.documents.get(&uri).cloned());
                }
                StoreCommand::Version { snapshot, reply } => {
                    let _ = reply.send(self.versions.try_get_version(&snapshot));
                }
                StoreCommand::SetVersionHistory { history } => {
                    self.versions.set_history(history);
                    tracing::debug!("version history set to {}", self.versions.history());
                }
            }
        }
        tracing::debug!("document store stopped");
    }

    fn handle_open(&mut self, uri: Uri, text: String, version: i32) -> Result<()> {
        if self.documents.contains_key(&uri) {
            tracing::warn!("document reopened without close: {:?}", uri);
            self.versions.untrack(&uri);
        }

        let snapshot = HostDocumentSnapshot::new(uri.clone(), text.into(), version);
        self.versions.track(&snapshot)?;
        self.notify(uri.clone(), Some(&snapshot));
        self.documents.insert(uri, snapshot);
        Ok(())
    }

    fn handle_change(&mut self, uri: Uri, text: String, version: i32) -> Result<()> {
        if !self.documents.contains_key(&uri) {
            tracing::warn!("change for unopened document: {:?}", uri);
            return Err(RazorError::DocumentNotOpen {
                uri: uri.as_str().to_string(),
            });
        }

        let snapshot = HostDocumentSnapshot::new(uri.clone(), text.into(), version);
        if let Err(e) = self.versions.track(&snapshot) {
            tracing::warn!("rejected change: {}", e);
            return Err(e);
        }
        self.notify(uri.clone(), Some(&snapshot));
        self.documents.insert(uri, snapshot);
        Ok(())
    }

    fn handle_close(&mut self, uri: Uri) -> bool {
        self.versions.untrack(&uri);
        let was_open = self.documents.remove(&uri).is_some();
        if was_open {
            self.notify(uri, None);
        }
        was_open
    }

    fn notify(&self, uri: Uri, snapshot: Option<&HostDocumentSnapshot>) {
        // No subscribers is not an error.
        let _ = self.events.send(DocumentChanged {
            uri,
            version: snapshot.map(HostDocumentSnapshot::version),
            snapshot: snapshot.map(HostDocumentSnapshot::id),
        });
    }
}
