//! Bidirectional source mappings between the host document and the
//! projected C# document.
//!
//! A [`SourceMappingIndex`] is immutable once built. Construction sorts the
//! mappings and rejects sets that overlap or that do not correspond
//! monotonically in both coordinate spaces, which is what allows every
//! lookup to be a binary search.

use serde::{Deserialize, Serialize};

use crate::error::{RazorError, Result};
use crate::span::TextSpan;

/// One host range paired with the projected range generated from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapping {
    pub original: TextSpan,
    pub projected: TextSpan,
}

impl SourceMapping {
    pub const fn new(original: TextSpan, projected: TextSpan) -> Self {
        Self {
            original,
            projected,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMappingIndex {
    mappings: Vec<SourceMapping>,
}

impl SourceMappingIndex {
    /// Builds an index, sorting by original start.
    ///
    /// # Errors
    ///
    /// Returns [`RazorError::InvalidSourceMappings`] when two mappings overlap
    /// in either document, or when their projected order differs from their
    /// original order.
    ///
    /// # Examples
    ///
    /// ```
    /// use razor_core::source_mapping::{SourceMapping, SourceMappingIndex};
    /// use razor_core::span::TextSpan;
    ///
    /// let index = SourceMappingIndex::new(vec![SourceMapping::new(
    ///     TextSpan::new(10, 10),
    ///     TextSpan::new(100, 10),
    /// )])
    /// .unwrap();
    ///
    /// assert_eq!(index.try_map_to_projected(15), Some(105));
    /// assert_eq!(index.try_map_to_projected(20), None);
    /// ```
    pub fn new(mut mappings: Vec<SourceMapping>) -> Result<Self> {
        mappings.sort_by_key(|m| (m.original.start, m.original.length));

        for pair in mappings.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.original.end() > next.original.start {
                return Err(RazorError::InvalidSourceMappings(format!(
                    "original ranges {}..{} and {}..{} overlap",
                    prev.original.start,
                    prev.original.end(),
                    next.original.start,
                    next.original.end()
                )));
            }
            if prev.projected.end() > next.projected.start {
                return Err(RazorError::InvalidSourceMappings(format!(
                    "projected range {}..{} does not precede {}..{}",
                    prev.projected.start,
                    prev.projected.end(),
                    next.projected.start,
                    next.projected.end()
                )));
            }
        }

        Ok(Self { mappings })
    }

    pub fn mappings(&self) -> &[SourceMapping] {
        &self.mappings
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// The last mapping whose original range starts at or before `offset`.
    fn by_original(&self, offset: usize) -> Option<&SourceMapping> {
        let idx = self
            .mappings
            .partition_point(|m| m.original.start <= offset);
        idx.checked_sub(1).map(|i| &self.mappings[i])
    }

    /// The last mapping whose projected range starts at or before `offset`.
    fn by_projected(&self, offset: usize) -> Option<&SourceMapping> {
        let idx = self
            .mappings
            .partition_point(|m| m.projected.start <= offset);
        idx.checked_sub(1).map(|i| &self.mappings[i])
    }

    /// Maps a host offset into the projected document.
    ///
    /// Succeeds only for offsets inside a mapping's original range
    /// (closed-open). A miss is expected for host text that has no generated
    /// counterpart.
    pub fn try_map_to_projected(&self, host_offset: usize) -> Option<usize> {
        let mapping = self.by_original(host_offset)?;
        if !mapping.original.contains(host_offset) {
            return None;
        }
        let distance = host_offset - mapping.original.start;
        (distance <= mapping.projected.length).then(|| mapping.projected.start + distance)
    }

    /// Maps a projected offset back to the host document (closed-open).
    pub fn try_map_from_projected_offset(&self, projected_offset: usize) -> Option<usize> {
        let mapping = self.by_projected(projected_offset)?;
        if !mapping.projected.contains(projected_offset) {
            return None;
        }
        let distance = projected_offset - mapping.projected.start;
        (distance <= mapping.original.length).then(|| mapping.original.start + distance)
    }

    /// Maps a projected range back to the host document.
    ///
    /// The range must lie entirely inside a single mapping's projected range.
    /// Ranges that straddle a mapping boundary are rejected, never truncated.
    pub fn try_map_from_projected(&self, projected: TextSpan) -> Option<TextSpan> {
        let mapping = self.by_projected(projected.start)?;
        if !mapping.projected.contains_span(&projected) {
            return None;
        }
        let start = mapping.original.start + (projected.start - mapping.projected.start);
        let host = TextSpan::new(start, projected.length);
        mapping.original.contains_span(&host).then_some(host)
    }
}
