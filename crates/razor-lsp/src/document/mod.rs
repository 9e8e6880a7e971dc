//! Host document state: the single-writer store and the per-version
//! generated document cache.

mod generated_cache;
mod store;

pub use generated_cache::GeneratedDocumentCache;
pub use store::{DocumentChanged, DocumentStore, DocumentStoreHandle, StoreCommand};
