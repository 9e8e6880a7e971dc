//! Position mapping between host and projected documents over LSP
//! coordinates.

use tower_lsp_server::ls_types::{Position, Range};

use crate::error::{RazorError, Result};
use crate::generated::GeneratedDocument;

/// Resolves a host position to a byte offset.
///
/// # Errors
///
/// Returns [`RazorError::InvalidPosition`] when the line does not exist in
/// the host document or the column lies past the end of the line.
pub fn host_offset(doc: &GeneratedDocument, position: Position) -> Result<usize> {
    doc.host()
        .position_to_offset(position)
        .ok_or(RazorError::InvalidPosition {
            line: position.line,
            character: position.character,
        })
}

/// Maps a host offset to a position and offset in the projected C#
/// document. `None` when the offset has no generated counterpart.
pub fn try_map_to_projected(doc: &GeneratedDocument, host_offset: usize) -> Option<(Position, usize)> {
    let projected = doc.source_mappings().try_map_to_projected(host_offset)?;
    Some((doc.csharp().offset_to_position(projected), projected))
}

/// Maps a projected C# range back into the host document.
///
/// Fails for ranges that cannot be resolved in the projected text and for
/// ranges not wholly inside a single mapping.
pub fn try_map_from_projected(doc: &GeneratedDocument, projected: Range) -> Option<Range> {
    let span = doc.csharp().range_to_span(projected)?;
    let host = doc.source_mappings().try_map_from_projected(span)?;
    Some(doc.host().span_to_range(host))
}
