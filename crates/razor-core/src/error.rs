use thiserror::Error;

/// Core error types for razor-lsp.
///
/// Mapping misses are not errors: they surface as `None` from the mapping
/// functions and are handled by sentinel or drop policies. The variants here
/// cover malformed input, rejected document state and aborted requests.
///
/// # Examples
///
/// ```
/// use razor_core::error::{RazorError, Result};
///
/// fn check_line(line: u32, line_count: u32) -> Result<()> {
///     if line >= line_count {
///         return Err(RazorError::InvalidPosition { line, character: 0 });
///     }
///     Ok(())
/// }
///
/// assert!(check_line(3, 2).is_err());
/// ```
#[derive(Error, Debug)]
pub enum RazorError {
    #[error("position {line}:{character} is outside the document")]
    InvalidPosition { line: u32, character: u32 },

    #[error("invalid source mappings: {0}")]
    InvalidSourceMappings(String),

    #[error("invalid classified spans: {0}")]
    InvalidSpans(String),

    #[error("stale version {received} for {uri} (current {current})")]
    StaleVersion {
        uri: String,
        current: i32,
        received: i32,
    },

    #[error("document not open: {uri}")]
    DocumentNotOpen { uri: String },

    #[error("document store is shut down")]
    StoreClosed,

    #[error("request cancelled")]
    Cancelled,

    #[error("formatting failed: {source}")]
    Formatting {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("generated output unavailable for {uri} at version {version}")]
    GeneratedOutputUnavailable { uri: String, version: i32 },
}

/// Convenience type alias for `Result<T, RazorError>`.
///
/// # Examples
///
/// ```
/// use razor_core::error::Result;
///
/// fn half(n: usize) -> Result<usize> {
///     Ok(n / 2)
/// }
///
/// assert_eq!(half(10).unwrap(), 5);
/// ```
pub type Result<T> = std::result::Result<T, RazorError>;
