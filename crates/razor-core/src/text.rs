//! Byte offset <-> LSP position conversion.
//!
//! LSP positions use zero-based lines and UTF-16 code unit columns; every
//! offset in this crate is a byte offset into UTF-8 text.

use std::sync::Arc;

use tower_lsp_server::ls_types::{Position, Range};

use crate::span::TextSpan;

/// Pre-computed line starts for one immutable text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    text: Arc<str>,
}

impl LineIndex {
    pub fn new(text: Arc<str>) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                text.char_indices()
                    .filter(|&(_, c)| c == '\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();

        Self { line_starts, text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Bounds of `line` excluding its line terminator.
    fn line_bounds(&self, line: usize) -> (usize, usize) {
        let start = self.line_starts[line];
        let end = self
            .line_starts
            .get(line + 1)
            .map_or(self.text.len(), |&next| next - 1);
        let end = if end > start && self.text.as_bytes()[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };
        (start, end)
    }

    /// Converts a byte offset to a position. Offsets past the end clamp to
    /// the end of the text.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let (start, end) = self.line_bounds(line);

        let character = self.text[start..end]
            .char_indices()
            .take_while(|(i, _)| start + i < offset)
            .map(|(_, c)| c.len_utf16() as u32)
            .sum();

        Position::new(line as u32, character)
    }

    /// Converts a position to a byte offset.
    ///
    /// Returns `None` when the line does not exist or the column lies past
    /// the end of the line.
    pub fn position_to_offset(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        if line >= self.line_starts.len() {
            return None;
        }
        let (start, end) = self.line_bounds(line);

        let mut column = 0u32;
        for (i, c) in self.text[start..end].char_indices() {
            if column >= position.character {
                return Some(start + i);
            }
            column += c.len_utf16() as u32;
        }
        (column >= position.character).then_some(end)
    }

    pub fn span_to_range(&self, span: TextSpan) -> Range {
        Range::new(
            self.offset_to_position(span.start),
            self.offset_to_position(span.end()),
        )
    }

    /// Converts a range to a span. `None` if either end is outside the text
    /// or the range is inverted.
    pub fn range_to_span(&self, range: Range) -> Option<TextSpan> {
        let start = self.position_to_offset(range.start)?;
        let end = self.position_to_offset(range.end)?;
        TextSpan::from_bounds(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(text: &str) -> LineIndex {
        LineIndex::new(Arc::from(text))
    }

    #[test]
    fn test_single_line() {
        let idx = index("hello world");
        assert_eq!(idx.offset_to_position(0), Position::new(0, 0));
        assert_eq!(idx.offset_to_position(11), Position::new(0, 11));
        assert_eq!(idx.position_to_offset(Position::new(0, 5)), Some(5));
    }

    #[test]
    fn test_multi_line() {
        let idx = index("hello\nworld\ntest");
        assert_eq!(idx.line_count(), 3);
        assert_eq!(idx.offset_to_position(6), Position::new(1, 0));
        assert_eq!(idx.offset_to_position(12), Position::new(2, 0));
        assert_eq!(idx.position_to_offset(Position::new(1, 5)), Some(11));
    }

    #[test]
    fn test_crlf_line_end_excluded() {
        let idx = index("ab\r\ncd");
        assert_eq!(idx.position_to_offset(Position::new(0, 2)), Some(2));
        assert_eq!(idx.position_to_offset(Position::new(0, 3)), None);
        assert_eq!(idx.position_to_offset(Position::new(1, 1)), Some(5));
    }

    #[test]
    fn test_utf16_columns() {
        let idx = index("a\u{1F600}b");
        assert_eq!(idx.offset_to_position(5), Position::new(0, 3));
        assert_eq!(idx.position_to_offset(Position::new(0, 3)), Some(5));
    }

    #[test]
    fn test_line_out_of_bounds() {
        let idx = index("hello");
        assert_eq!(idx.position_to_offset(Position::new(1, 0)), None);
    }

    #[test]
    fn test_column_past_line_end_is_rejected() {
        let idx = index("hi\nthere");
        assert_eq!(idx.position_to_offset(Position::new(0, 2)), Some(2));
        assert_eq!(idx.position_to_offset(Position::new(0, 40)), None);
        assert_eq!(idx.position_to_offset(Position::new(1, 6)), None);
    }

    #[test]
    fn test_range_past_line_end_is_rejected() {
        let idx = index("name\n");
        let range = Range::new(Position::new(0, 2), Position::new(0, 500));
        assert_eq!(idx.range_to_span(range), None);
    }

    #[test]
    fn test_span_range_conversion() {
        let idx = index("hello\nworld");
        let range = idx.span_to_range(TextSpan::new(6, 5));
        assert_eq!(range, Range::new(Position::new(1, 0), Position::new(1, 5)));
        assert_eq!(idx.range_to_span(range), Some(TextSpan::new(6, 5)));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let idx = index("hello world");
        let range = Range::new(Position::new(0, 6), Position::new(0, 2));
        assert_eq!(idx.range_to_span(range), None);
    }
}
