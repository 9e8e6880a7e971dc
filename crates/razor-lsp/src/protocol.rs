//! Wire types for the Razor custom LSP methods.

use razor_core::{GeneratedOutput, LanguageKind};
use serde::{Deserialize, Serialize};
use tower_lsp_server::ls_types::request::Request;
use tower_lsp_server::ls_types::{FormattingOptions, Position, Range, TextEdit, Uri};

/// Custom method names.
pub mod methods {
    pub const LANGUAGE_QUERY: &str = "razor/languageQuery";
    pub const MAP_TO_DOCUMENT_RANGES: &str = "razor/mapToDocumentRanges";
    pub const MAP_TO_DOCUMENT_EDITS: &str = "razor/mapToDocumentEdits";
    pub const UPDATE_GENERATED_OUTPUT: &str = "razor/updateGeneratedOutput";
    pub const FORMAT_PROJECTED_EDITS: &str = "razor/formatProjectedEdits";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageQueryParams {
    pub uri: Uri,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageQueryResponse {
    pub kind: LanguageKind,
    /// Projected position for mapped C#, the request position otherwise.
    pub position: Position,
    /// Byte offset matching `position`, `-1` when the document is unknown.
    pub position_index: i64,
    pub host_document_version: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapToDocumentRangesParams {
    pub razor_document_uri: Uri,
    pub kind: LanguageKind,
    pub projected_ranges: Vec<Range>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapToDocumentRangesResponse {
    /// One entry per requested range, in request order.
    pub ranges: Vec<MappedRange>,
    pub host_document_version: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapToDocumentEditsParams {
    pub razor_document_uri: Uri,
    pub kind: LanguageKind,
    pub projected_edits: Vec<TextEdit>,
    #[serde(default)]
    pub should_format: bool,
    #[serde(default)]
    pub formatting_options: Option<FormattingOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapToDocumentEditsResponse {
    pub text_edits: Vec<TextEdit>,
    pub host_document_version: i32,
}

/// Compiler output for one host version, pushed by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGeneratedOutputParams {
    pub uri: Uri,
    pub host_document_version: i32,
    #[serde(flatten)]
    pub output: GeneratedOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatProjectedEditsParams {
    pub razor_document_uri: Uri,
    pub host_document_version: i32,
    pub kind: LanguageKind,
    pub projected_edits: Vec<TextEdit>,
    pub options: FormattingOptions,
}

/// Server to client request asking the editor to format projected edits.
#[derive(Debug)]
pub enum FormatProjectedEdits {}

impl Request for FormatProjectedEdits {
    type Params = FormatProjectedEditsParams;
    type Result = Vec<TextEdit>;
    const METHOD: &'static str = methods::FORMAT_PROJECTED_EDITS;
}

/// A host range, or the undefined range for projected ranges that could
/// not be mapped.
///
/// On the wire the undefined range has every component set to `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireRange", into = "WireRange")]
pub struct MappedRange(pub Option<Range>);

impl MappedRange {
    pub const UNDEFINED: Self = Self(None);

    pub const fn is_undefined(&self) -> bool {
        self.0.is_none()
    }
}

impl From<Option<Range>> for MappedRange {
    fn from(range: Option<Range>) -> Self {
        Self(range)
    }
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct WirePosition {
    line: i64,
    character: i64,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct WireRange {
    start: WirePosition,
    end: WirePosition,
}

const UNDEFINED_POSITION: WirePosition = WirePosition {
    line: -1,
    character: -1,
};

impl From<Position> for WirePosition {
    fn from(p: Position) -> Self {
        Self {
            line: i64::from(p.line),
            character: i64::from(p.character),
        }
    }
}

impl From<MappedRange> for WireRange {
    fn from(range: MappedRange) -> Self {
        match range.0 {
            Some(r) => Self {
                start: r.start.into(),
                end: r.end.into(),
            },
            None => Self {
                start: UNDEFINED_POSITION,
                end: UNDEFINED_POSITION,
            },
        }
    }
}

impl From<WireRange> for MappedRange {
    fn from(wire: WireRange) -> Self {
        let position = |p: WirePosition| {
            Some(Position::new(
                u32::try_from(p.line).ok()?,
                u32::try_from(p.character).ok()?,
            ))
        };
        match (position(wire.start), position(wire.end)) {
            (Some(start), Some(end)) => Self(Some(Range::new(start, end))),
            _ => Self::UNDEFINED,
        }
    }
}
