//! Core coordinate mapping for razor-lsp.
//!
//! A Razor host document mixes markup and embedded C#. The compiler
//! produces a projected C# document from it, plus source mappings that tie
//! ranges of the two together. This crate answers coordinate questions
//! across those views:
//!
//! - **Classification**: which language owns a host offset ([`classify`])
//! - **Source mappings**: offset and span translation ([`SourceMappingIndex`])
//! - **Position mapping**: the same over LSP positions ([`position`])
//! - **Projection**: ranges and edits back into the host ([`projection`])
//! - **Versioning**: which host version a snapshot belongs to
//!   ([`DocumentVersionCache`])
//!
//! Everything here is synchronous and pure over immutable data, except the
//! [`Formatter`] seam, which is async.
//!
//! # Examples
//!
//! ```
//! use razor_core::{
//!     ClassifiedSpan, EdgeOwnership, GeneratedDocument, GeneratedOutput, HostDocumentSnapshot,
//!     LanguageKind, SourceMapping, SpanKind, TextSpan,
//! };
//! use tower_lsp_server::ls_types::{Position, Uri};
//!
//! let uri = Uri::from_file_path("/Index.razor").unwrap();
//! let snapshot = HostDocumentSnapshot::new(uri, "<p>@name</p>".into(), 1);
//!
//! let doc = GeneratedDocument::new(
//!     &snapshot,
//!     GeneratedOutput {
//!         csharp_text: "__o = name;".into(),
//!         classified_spans: vec![
//!             ClassifiedSpan::new(0, 3, SpanKind::Markup, EdgeOwnership::DoesNotOwn),
//!             ClassifiedSpan::new(3, 1, SpanKind::Transition, EdgeOwnership::DoesNotOwn),
//!             ClassifiedSpan::new(4, 4, SpanKind::Code, EdgeOwnership::Owns),
//!             ClassifiedSpan::new(8, 4, SpanKind::Markup, EdgeOwnership::DoesNotOwn),
//!         ],
//!         tag_helper_spans: vec![],
//!         source_mappings: vec![SourceMapping::new(TextSpan::new(4, 4), TextSpan::new(6, 4))],
//!     },
//! )
//! .unwrap();
//!
//! assert_eq!(doc.language_kind(5), LanguageKind::CSharp);
//!
//! let (projected, _) = razor_core::position::try_map_to_projected(&doc, 5).unwrap();
//! assert_eq!(projected, Position::new(0, 7));
//! ```

pub mod classify;
pub mod document;
pub mod error;
pub mod generated;
pub mod position;
pub mod projection;
pub mod source_mapping;
pub mod span;
pub mod text;
pub mod version;

// Re-export commonly used types
pub use classify::{ClassifiedSpan, EdgeOwnership, LanguageKind, SpanKind, TagHelperSpan, classify};
pub use document::{HostDocumentSnapshot, SnapshotId};
pub use error::{RazorError, Result};
pub use generated::{DocumentGenerator, GeneratedDocument, GeneratedOutput};
pub use projection::{EditProjector, Formatter, map_edits, map_ranges};
pub use source_mapping::{SourceMapping, SourceMappingIndex};
pub use span::TextSpan;
pub use text::LineIndex;
pub use version::{DEFAULT_VERSION_HISTORY, DocumentVersionCache, UNDEFINED_VERSION};
