use serde::{Deserialize, Serialize};

/// A contiguous byte range `[start, start + length)` in one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub length: usize,
}

impl TextSpan {
    pub const fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Builds a span from `start..end`. Returns `None` when `end < start`.
    pub fn from_bounds(start: usize, end: usize) -> Option<Self> {
        end.checked_sub(start).map(|length| Self { start, length })
    }

    pub const fn end(&self) -> usize {
        self.start + self.length
    }

    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Closed-open containment: `start <= offset < end`.
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end()
    }

    /// Closed containment: `start <= offset <= end`.
    pub const fn touches(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end()
    }

    /// True when `other` lies entirely inside this span (shared edges allowed).
    pub const fn contains_span(&self, other: &Self) -> bool {
        self.start <= other.start && other.end() <= self.end()
    }

    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}
