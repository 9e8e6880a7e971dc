//! Per-request orchestration.
//!
//! Each request walks the same stages:
//!
//! ```text
//! ResolveSnapshot -> ResolveVersion -> GenerateOrReuse -> Dispatch -> Respond
//! ```
//!
//! The first two cross into the document store and are the only points,
//! besides the formatter call, where a request can be cancelled. Everything
//! after runs on the calling task against an immutable generated document.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use razor_core::{
    DocumentGenerator, EditProjector, Formatter, GeneratedDocument, LanguageKind, RazorError,
    Result, UNDEFINED_VERSION, map_ranges, position,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_lsp_server::ls_types::{FormattingOptions, Uri};

use crate::config::FormattingConfig;
use crate::document::{DocumentStoreHandle, GeneratedDocumentCache};
use crate::protocol::{
    LanguageQueryParams, LanguageQueryResponse, MapToDocumentEditsParams,
    MapToDocumentEditsResponse, MapToDocumentRangesParams, MapToDocumentRangesResponse,
    MappedRange,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    ResolveSnapshot,
    ResolveVersion,
    GenerateOrReuse,
    Dispatch,
    Respond,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResolveSnapshot => "resolve-snapshot",
            Self::ResolveVersion => "resolve-version",
            Self::GenerateOrReuse => "generate-or-reuse",
            Self::Dispatch => "dispatch",
            Self::Respond => "respond",
        };
        f.write_str(name)
    }
}

/// Document state a request runs against.
struct Resolved {
    version: i32,
    /// `None` when the document is not open.
    doc: Option<Arc<GeneratedDocument>>,
}

pub struct RequestCoordinator {
    store: DocumentStoreHandle,
    generator: Arc<dyn DocumentGenerator>,
    cache: Arc<GeneratedDocumentCache>,
    projector: EditProjector,
    watcher: JoinHandle<()>,
}

impl RequestCoordinator {
    pub fn new(
        store: DocumentStoreHandle,
        generator: Arc<dyn DocumentGenerator>,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        let cache = Arc::new(GeneratedDocumentCache::new());
        let watcher = Arc::clone(&cache).watch(store.subscribe());
        Self {
            store,
            generator,
            cache,
            projector: EditProjector::new(formatter),
            watcher,
        }
    }

    pub const fn store(&self) -> &DocumentStoreHandle {
        &self.store
    }

    pub fn cache(&self) -> &GeneratedDocumentCache {
        &self.cache
    }

    async fn resolve(&self, uri: &Uri, token: &CancellationToken) -> Result<Resolved> {
        trace_stage(Stage::ResolveSnapshot, uri);
        let Some(snapshot) = cancellable(token, self.store.snapshot(uri.clone())).await?? else {
            tracing::debug!("document not open: {:?}", uri);
            return Ok(Resolved {
                version: UNDEFINED_VERSION,
                doc: None,
            });
        };

        trace_stage(Stage::ResolveVersion, uri);
        let version = cancellable(token, self.store.version(snapshot.clone()))
            .await??
            .unwrap_or(UNDEFINED_VERSION);

        trace_stage(Stage::GenerateOrReuse, uri);
        let doc = self
            .cache
            .get_or_generate(&snapshot, self.generator.as_ref());

        trace_stage(Stage::Dispatch, uri);
        Ok(Resolved {
            version,
            doc: Some(doc),
        })
    }

    /// Classifies a host position and, for C#, maps it into the projected
    /// document.
    ///
    /// # Errors
    ///
    /// [`RazorError::InvalidPosition`] when the position lies outside the
    /// host document, and [`RazorError::Cancelled`].
    pub async fn language_query(
        &self,
        params: LanguageQueryParams,
        token: &CancellationToken,
    ) -> Result<LanguageQueryResponse> {
        let resolved = self.resolve(&params.uri, token).await?;
        let echo = |position_index: i64| LanguageQueryResponse {
            kind: LanguageKind::Html,
            position: params.position,
            position_index,
            host_document_version: resolved.version,
        };

        let Some(doc) = resolved.doc.as_deref() else {
            trace_stage(Stage::Respond, &params.uri);
            return Ok(echo(-1));
        };

        let host_offset = position::host_offset(doc, params.position)?;
        if doc.is_unsupported() {
            trace_stage(Stage::Respond, &params.uri);
            return Ok(echo(host_offset as i64));
        }

        let kind = doc.language_kind(host_offset);
        let (position, position_index) = match kind {
            LanguageKind::CSharp => match position::try_map_to_projected(doc, host_offset) {
                Some((projected, offset)) => (projected, offset),
                None => {
                    tracing::debug!("no projection for C# offset {}", host_offset);
                    (params.position, host_offset)
                }
            },
            _ => (params.position, host_offset),
        };

        trace_stage(Stage::Respond, &params.uri);
        Ok(LanguageQueryResponse {
            kind,
            position,
            position_index: position_index as i64,
            host_document_version: resolved.version,
        })
    }

    /// Maps projected ranges back to the host, one answer per input range.
    pub async fn map_to_document_ranges(
        &self,
        params: MapToDocumentRangesParams,
        token: &CancellationToken,
    ) -> Result<MapToDocumentRangesResponse> {
        let resolved = self.resolve(&params.razor_document_uri, token).await?;

        let ranges = match resolved.doc.as_deref() {
            // Non-C# ranges already are host ranges, whatever the document state.
            _ if params.kind != LanguageKind::CSharp => params
                .projected_ranges
                .into_iter()
                .map(|range| MappedRange(Some(range)))
                .collect(),
            Some(doc) if !doc.is_unsupported() => {
                map_ranges(doc, params.kind, &params.projected_ranges)
                    .into_iter()
                    .map(MappedRange::from)
                    .collect()
            }
            _ => Vec::new(),
        };

        trace_stage(Stage::Respond, &params.razor_document_uri);
        Ok(MapToDocumentRangesResponse {
            ranges,
            host_document_version: resolved.version,
        })
    }

    /// Maps projected edits back to the host, formatting them first when
    /// requested and enabled.
    pub async fn map_to_document_edits(
        &self,
        params: MapToDocumentEditsParams,
        formatting: &FormattingConfig,
        token: &CancellationToken,
    ) -> Result<MapToDocumentEditsResponse> {
        let resolved = self.resolve(&params.razor_document_uri, token).await?;

        let text_edits = match resolved.doc.as_deref() {
            Some(doc) if !doc.is_unsupported() => {
                let should_format = params.should_format && formatting.enabled;
                if params.should_format && !formatting.enabled {
                    tracing::debug!("formatting disabled, mapping edits unformatted");
                }
                let options: FormattingOptions = params
                    .formatting_options
                    .unwrap_or_else(|| formatting.default_options.clone());

                cancellable(
                    token,
                    self.projector.map_edits(
                        doc,
                        params.kind,
                        params.projected_edits,
                        should_format,
                        &options,
                    ),
                )
                .await??
            }
            _ if params.kind != LanguageKind::CSharp => params.projected_edits,
            _ => Vec::new(),
        };

        trace_stage(Stage::Respond, &params.razor_document_uri);
        Ok(MapToDocumentEditsResponse {
            text_edits,
            host_document_version: resolved.version,
        })
    }
}

impl Drop for RequestCoordinator {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

/// Races `fut` against cancellation.
async fn cancellable<F: Future>(token: &CancellationToken, fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        () = token.cancelled() => Err(RazorError::Cancelled),
        out = fut => Ok(out),
    }
}

fn trace_stage(stage: Stage, uri: &Uri) {
    tracing::debug!(%stage, "request {:?}", uri.as_str());
}
