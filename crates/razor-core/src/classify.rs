//! Classification of host document offsets into a language kind.
//!
//! The host document is covered by classified spans produced by the Razor
//! parser, plus tag-helper spans for elements bound to tag helpers. A single
//! offset always resolves to exactly one [`LanguageKind`].
//!
//! Resolution order is fixed: classified spans first, tag-helper spans
//! second, [`LanguageKind::Razor`] last.

use serde::{Deserialize, Serialize};

use crate::span::TextSpan;

/// Language of a host document position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageKind {
    Html,
    CSharp,
    Razor,
}

/// Content kind of a classified span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanKind {
    Markup,
    Code,
    Transition,
    MetaCode,
    Comment,
    None,
}

impl SpanKind {
    pub const fn language(self) -> LanguageKind {
        match self {
            Self::Markup => LanguageKind::Html,
            Self::Code => LanguageKind::CSharp,
            _ => LanguageKind::Razor,
        }
    }
}

/// Whether a span claims the offset at its right edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EdgeOwnership {
    Owns,
    #[default]
    DoesNotOwn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedSpan {
    pub span: TextSpan,
    pub kind: SpanKind,
    #[serde(default)]
    pub edge: EdgeOwnership,
}

impl ClassifiedSpan {
    pub const fn new(start: usize, length: usize, kind: SpanKind, edge: EdgeOwnership) -> Self {
        Self {
            span: TextSpan::new(start, length),
            kind,
            edge,
        }
    }

    /// A span owns its right edge only if it is non-empty and flagged `Owns`.
    pub const fn owns_end(&self) -> bool {
        !self.span.is_empty() && matches!(self.edge, EdgeOwnership::Owns)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagHelperSpan {
    pub span: TextSpan,
}

impl TagHelperSpan {
    pub const fn new(start: usize, length: usize) -> Self {
        Self {
            span: TextSpan::new(start, length),
        }
    }
}

/// Classifies `offset` in the host document.
///
/// `classified` must be ordered by start offset (see
/// [`crate::GeneratedDocument::new`], which validates this).
///
/// # Examples
///
/// ```
/// use razor_core::classify::{ClassifiedSpan, EdgeOwnership, LanguageKind, SpanKind, classify};
///
/// let spans = [
///     ClassifiedSpan::new(0, 10, SpanKind::Markup, EdgeOwnership::DoesNotOwn),
///     ClassifiedSpan::new(10, 20, SpanKind::Code, EdgeOwnership::DoesNotOwn),
/// ];
///
/// assert_eq!(classify(&spans, &[], 4), LanguageKind::Html);
/// assert_eq!(classify(&spans, &[], 10), LanguageKind::CSharp);
/// assert_eq!(classify(&spans, &[], 30), LanguageKind::Razor);
/// ```
pub fn classify(
    classified: &[ClassifiedSpan],
    tag_helpers: &[TagHelperSpan],
    offset: usize,
) -> LanguageKind {
    for candidate in classified {
        if candidate.span.start > offset {
            break;
        }
        if !candidate.span.touches(offset) {
            continue;
        }
        if offset == candidate.span.end() && !candidate.owns_end() {
            continue;
        }
        return candidate.kind.language();
    }

    // Tag-helper spans never own their right edge.
    if tag_helpers.iter().any(|t| t.span.contains(offset)) {
        return LanguageKind::Html;
    }

    LanguageKind::Razor
}
