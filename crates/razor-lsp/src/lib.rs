pub mod config;
pub mod coordinator;
pub mod document;
pub mod error;
pub mod formatting;
pub mod generator;
pub mod protocol;
pub mod server;

// Re-export commonly used types
pub use coordinator::RequestCoordinator;
pub use server::Backend;
