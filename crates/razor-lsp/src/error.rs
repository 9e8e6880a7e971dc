//! Conversion of core errors into JSON-RPC errors at the server boundary.

use std::borrow::Cow;

use razor_core::RazorError;
use tower_lsp_server::jsonrpc::{Error, ErrorCode};

/// Maps a [`RazorError`] to the JSON-RPC error reported to the client.
///
/// Malformed request input becomes `InvalidParams`, cancellation becomes
/// `RequestCancelled`, and everything else is an internal error.
///
/// # Examples
///
/// ```
/// use razor_core::RazorError;
/// use razor_lsp::error::to_jsonrpc;
/// use tower_lsp_server::jsonrpc::ErrorCode;
///
/// let err = to_jsonrpc(RazorError::InvalidPosition { line: 9, character: 0 });
/// assert_eq!(err.code, ErrorCode::InvalidParams);
/// ```
pub fn to_jsonrpc(err: RazorError) -> Error {
    let code = match &err {
        RazorError::InvalidPosition { .. } => ErrorCode::InvalidParams,
        RazorError::Cancelled => ErrorCode::RequestCancelled,
        _ => ErrorCode::InternalError,
    };
    Error {
        code,
        message: Cow::Owned(err.to_string()),
        data: None,
    }
}
