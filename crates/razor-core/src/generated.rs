//! Generated documents: the immutable per-version artifact every mapping
//! operation reads from.

use serde::{Deserialize, Serialize};
use tower_lsp_server::ls_types::Uri;

use crate::classify::{ClassifiedSpan, LanguageKind, TagHelperSpan, classify};
use crate::document::{HostDocumentSnapshot, SnapshotId};
use crate::error::{RazorError, Result};
use crate::source_mapping::{SourceMapping, SourceMappingIndex};
use crate::text::LineIndex;

/// Raw compiler output for one host version, as supplied by the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedOutput {
    pub csharp_text: String,
    #[serde(default)]
    pub classified_spans: Vec<ClassifiedSpan>,
    #[serde(default)]
    pub tag_helper_spans: Vec<TagHelperSpan>,
    #[serde(default)]
    pub source_mappings: Vec<SourceMapping>,
}

/// Host document classification and its projected C# document at one
/// host version.
///
/// A generated document is never mutated. When the host version changes a
/// new one is built, and mappings still running against the old one finish
/// on the old data.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    uri: Uri,
    snapshot: SnapshotId,
    host_version: i32,
    host: LineIndex,
    csharp: LineIndex,
    classified_spans: Vec<ClassifiedSpan>,
    tag_helper_spans: Vec<TagHelperSpan>,
    source_mappings: SourceMappingIndex,
    unsupported: bool,
}

impl GeneratedDocument {
    /// Validates `output` against the snapshot text and builds the document.
    ///
    /// # Errors
    ///
    /// Returns [`RazorError::InvalidSpans`] when classified spans are out of
    /// order or any span runs past the host text, and
    /// [`RazorError::InvalidSourceMappings`] when mappings overlap, are not
    /// monotonic, or run past either text.
    pub fn new(snapshot: &HostDocumentSnapshot, output: GeneratedOutput) -> Result<Self> {
        let host = LineIndex::new(snapshot.text().clone());
        let csharp = LineIndex::new(output.csharp_text.into());

        validate_spans(&output.classified_spans, &output.tag_helper_spans, host.len())?;

        for mapping in &output.source_mappings {
            if mapping.original.end() > host.len() || mapping.projected.end() > csharp.len() {
                return Err(RazorError::InvalidSourceMappings(format!(
                    "mapping {}..{} -> {}..{} exceeds document bounds",
                    mapping.original.start,
                    mapping.original.end(),
                    mapping.projected.start,
                    mapping.projected.end()
                )));
            }
        }
        let source_mappings = SourceMappingIndex::new(output.source_mappings)?;

        Ok(Self {
            uri: snapshot.uri().clone(),
            snapshot: snapshot.id(),
            host_version: snapshot.version(),
            host,
            csharp,
            classified_spans: output.classified_spans,
            tag_helper_spans: output.tag_helper_spans,
            source_mappings,
            unsupported: false,
        })
    }

    /// A document the compiler could not handle. Every query against it
    /// degrades to Html with identity positions and empty mapping results.
    pub fn unsupported(snapshot: &HostDocumentSnapshot) -> Self {
        Self {
            uri: snapshot.uri().clone(),
            snapshot: snapshot.id(),
            host_version: snapshot.version(),
            host: LineIndex::new(snapshot.text().clone()),
            csharp: LineIndex::new("".into()),
            classified_spans: Vec::new(),
            tag_helper_spans: Vec::new(),
            source_mappings: SourceMappingIndex::default(),
            unsupported: true,
        }
    }

    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    pub const fn host_version(&self) -> i32 {
        self.host_version
    }

    /// Snapshot this document was generated from.
    pub const fn snapshot_id(&self) -> SnapshotId {
        self.snapshot
    }

    pub const fn is_unsupported(&self) -> bool {
        self.unsupported
    }

    pub const fn host(&self) -> &LineIndex {
        &self.host
    }

    pub const fn csharp(&self) -> &LineIndex {
        &self.csharp
    }

    pub fn classified_spans(&self) -> &[ClassifiedSpan] {
        &self.classified_spans
    }

    pub fn tag_helper_spans(&self) -> &[TagHelperSpan] {
        &self.tag_helper_spans
    }

    pub const fn source_mappings(&self) -> &SourceMappingIndex {
        &self.source_mappings
    }

    /// Language at a host byte offset.
    pub fn language_kind(&self, host_offset: usize) -> LanguageKind {
        classify(&self.classified_spans, &self.tag_helper_spans, host_offset)
    }
}

fn validate_spans(
    classified: &[ClassifiedSpan],
    tag_helpers: &[TagHelperSpan],
    host_len: usize,
) -> Result<()> {
    if let Some(pair) = classified
        .windows(2)
        .find(|pair| pair[1].span.start < pair[0].span.start)
    {
        return Err(RazorError::InvalidSpans(format!(
            "span at {} follows span at {}",
            pair[1].span.start, pair[0].span.start
        )));
    }

    let past_end = classified
        .iter()
        .map(|s| s.span)
        .chain(tag_helpers.iter().map(|t| t.span))
        .find(|span| span.end() > host_len);
    if let Some(span) = past_end {
        return Err(RazorError::InvalidSpans(format!(
            "span {}..{} exceeds host length {}",
            span.start,
            span.end(),
            host_len
        )));
    }

    Ok(())
}

/// Produces the generated document for a host snapshot.
///
/// Implementations are called at most once per (document, version) by the
/// request coordinator. Returning an error marks the version as
/// unsupported; it never fails the request.
pub trait DocumentGenerator: Send + Sync {
    fn generate(&self, snapshot: &HostDocumentSnapshot) -> Result<GeneratedDocument>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{EdgeOwnership, SpanKind};
    use crate::span::TextSpan;

    fn snapshot(text: &str) -> HostDocumentSnapshot {
        HostDocumentSnapshot::new(Uri::from_file_path("/Index.razor").unwrap(), text.into(), 4)
    }

    fn output() -> GeneratedOutput {
        GeneratedOutput {
            csharp_text: "class C { void M() { var x = count; } }".into(),
            classified_spans: vec![
                ClassifiedSpan::new(0, 3, SpanKind::Markup, EdgeOwnership::DoesNotOwn),
                ClassifiedSpan::new(3, 1, SpanKind::Transition, EdgeOwnership::DoesNotOwn),
                ClassifiedSpan::new(4, 5, SpanKind::Code, EdgeOwnership::Owns),
                ClassifiedSpan::new(9, 4, SpanKind::Markup, EdgeOwnership::DoesNotOwn),
            ],
            tag_helper_spans: vec![],
            source_mappings: vec![SourceMapping::new(
                TextSpan::new(4, 5),
                TextSpan::new(29, 5),
            )],
        }
    }

    #[test]
    fn test_new_keeps_snapshot_identity() {
        let snapshot = snapshot("<p>@count</p>");
        let doc = GeneratedDocument::new(&snapshot, output()).unwrap();
        assert_eq!(doc.host_version(), 4);
        assert_eq!(doc.snapshot_id(), snapshot.id());
        assert!(!doc.is_unsupported());
        assert_eq!(doc.source_mappings().len(), 1);
        assert_eq!(doc.host().text(), "<p>@count</p>");
    }

    #[test]
    fn test_language_kind_uses_classifier() {
        let doc = GeneratedDocument::new(&snapshot("<p>@count</p>"), output()).unwrap();
        assert_eq!(doc.language_kind(1), LanguageKind::Html);
        assert_eq!(doc.language_kind(3), LanguageKind::Razor);
        assert_eq!(doc.language_kind(6), LanguageKind::CSharp);
        assert_eq!(doc.language_kind(9), LanguageKind::CSharp);
        assert_eq!(doc.language_kind(10), LanguageKind::Html);
    }

    #[test]
    fn test_rejects_unordered_spans() {
        let mut out = output();
        out.classified_spans.swap(0, 2);
        let err = GeneratedDocument::new(&snapshot("<p>@count</p>"), out).unwrap_err();
        assert!(matches!(err, RazorError::InvalidSpans(_)));
    }

    #[test]
    fn test_rejects_span_past_host_end() {
        let mut out = output();
        out.tag_helper_spans.push(TagHelperSpan::new(10, 40));
        let err = GeneratedDocument::new(&snapshot("<p>@count</p>"), out).unwrap_err();
        assert!(matches!(err, RazorError::InvalidSpans(_)));
    }

    #[test]
    fn test_rejects_mapping_past_projected_end() {
        let mut out = output();
        out.source_mappings = vec![SourceMapping::new(
            TextSpan::new(4, 5),
            TextSpan::new(200, 5),
        )];
        let err = GeneratedDocument::new(&snapshot("<p>@count</p>"), out).unwrap_err();
        assert!(matches!(err, RazorError::InvalidSourceMappings(_)));
    }

    #[test]
    fn test_unsupported_document_is_empty() {
        let doc = GeneratedDocument::unsupported(&snapshot("@{ broken"));
        assert!(doc.is_unsupported());
        assert!(doc.source_mappings().is_empty());
        assert_eq!(doc.language_kind(2), LanguageKind::Razor);
    }

    #[test]
    fn test_output_deserializes_from_camel_case() {
        let json = r#"{
            "csharpText": "x",
            "classifiedSpans": [
                {"span": {"start": 0, "length": 1}, "kind": "Code", "edge": "Owns"}
            ],
            "sourceMappings": [
                {"original": {"start": 0, "length": 1}, "projected": {"start": 0, "length": 1}}
            ]
        }"#;
        let out: GeneratedOutput = serde_json::from_str(json).unwrap();
        assert_eq!(out.classified_spans[0].edge, EdgeOwnership::Owns);
        assert!(out.tag_helper_spans.is_empty());
        assert_eq!(out.source_mappings.len(), 1);
    }
}
