use crate::config::RazorConfig;
use crate::coordinator::RequestCoordinator;
use crate::document::{DocumentStore, DocumentStoreHandle};
use crate::error::to_jsonrpc;
use crate::formatting::ClientFormatter;
use crate::generator::PublishedOutputGenerator;
use crate::protocol::{
    LanguageQueryParams, LanguageQueryResponse, MapToDocumentEditsParams,
    MapToDocumentEditsResponse, MapToDocumentRangesParams, MapToDocumentRangesResponse,
    UpdateGeneratedOutputParams, methods,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_lsp_server::ls_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    InitializeParams, InitializeResult, InitializedParams, MessageType, ServerCapabilities,
    ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind,
};
use tower_lsp_server::{Client, ClientSocket, LanguageServer, LspService, jsonrpc::Result};

pub struct Backend {
    pub(crate) client: Client,
    store: DocumentStoreHandle,
    generator: Arc<PublishedOutputGenerator>,
    coordinator: RequestCoordinator,
    config: Arc<RwLock<RazorConfig>>,
    /// Parent of every per-request cancellation token.
    shutdown: CancellationToken,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        let config = RazorConfig::default();
        let store = DocumentStore::start(config.documents.version_history);
        let generator = Arc::new(PublishedOutputGenerator::new());
        let formatter = Arc::new(ClientFormatter::new(client.clone()));
        let coordinator = RequestCoordinator::new(store.clone(), generator.clone(), formatter);

        Self {
            client,
            store,
            generator,
            coordinator,
            config: Arc::new(RwLock::new(config)),
            shutdown: CancellationToken::new(),
        }
    }

    /// Builds the LSP service with the Razor custom methods registered.
    pub fn service() -> (LspService<Self>, ClientSocket) {
        LspService::build(Self::new)
            .custom_method(methods::LANGUAGE_QUERY, Self::language_query)
            .custom_method(methods::MAP_TO_DOCUMENT_RANGES, Self::map_to_document_ranges)
            .custom_method(methods::MAP_TO_DOCUMENT_EDITS, Self::map_to_document_edits)
            .custom_method(methods::UPDATE_GENERATED_OUTPUT, Self::update_generated_output)
            .finish()
    }

    /// Get a reference to the LSP client (primarily for testing/benchmarking).
    #[doc(hidden)]
    pub fn client(&self) -> &Client {
        &self.client
    }

    #[doc(hidden)]
    pub const fn coordinator(&self) -> &RequestCoordinator {
        &self.coordinator
    }

    fn server_capabilities() -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            experimental: Some(serde_json::json!({
                "razor": {
                    "languageQuery": true,
                    "mapToDocumentRanges": true,
                    "mapToDocumentEdits": true,
                    "updateGeneratedOutput": true
                }
            })),
            ..Default::default()
        }
    }

    pub async fn language_query(&self, params: LanguageQueryParams) -> Result<LanguageQueryResponse> {
        tracing::debug!(
            "languageQuery {:?} at {}:{}",
            params.uri,
            params.position.line,
            params.position.character
        );
        let token = self.shutdown.child_token();
        self.coordinator
            .language_query(params, &token)
            .await
            .map_err(to_jsonrpc)
    }

    pub async fn map_to_document_ranges(
        &self,
        params: MapToDocumentRangesParams,
    ) -> Result<MapToDocumentRangesResponse> {
        tracing::debug!(
            "mapToDocumentRanges {:?}: {} range(s)",
            params.razor_document_uri,
            params.projected_ranges.len()
        );
        let token = self.shutdown.child_token();
        self.coordinator
            .map_to_document_ranges(params, &token)
            .await
            .map_err(to_jsonrpc)
    }

    pub async fn map_to_document_edits(
        &self,
        params: MapToDocumentEditsParams,
    ) -> Result<MapToDocumentEditsResponse> {
        tracing::debug!(
            "mapToDocumentEdits {:?}: {} edit(s), format={}",
            params.razor_document_uri,
            params.projected_edits.len(),
            params.should_format
        );
        // Clone config before async call to release lock early
        let formatting = { self.config.read().await.formatting.clone() };
        let token = self.shutdown.child_token();
        self.coordinator
            .map_to_document_edits(params, &formatting, &token)
            .await
            .map_err(to_jsonrpc)
    }

    pub async fn update_generated_output(&self, params: UpdateGeneratedOutputParams) {
        let UpdateGeneratedOutputParams {
            uri,
            host_document_version,
            output,
        } = params;
        tracing::debug!(
            "generated output for {:?} v{}",
            uri,
            host_document_version
        );

        match self.store.snapshot(uri.clone()).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::debug!("ignoring generated output for unopened document {:?}", uri);
                return;
            }
            Err(e) => {
                tracing::error!("failed to resolve document {:?}: {}", uri, e);
                return;
            }
        }

        if self
            .generator
            .publish(uri.clone(), host_document_version, output)
        {
            self.coordinator.cache().invalidate(&uri);
        }
    }
}

impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("initializing razor-lsp server");

        // Parse initialization options
        if let Some(init_options) = params.initialization_options {
            match serde_json::from_value::<RazorConfig>(init_options) {
                Ok(config) => {
                    tracing::debug!("loaded configuration: {:?}", config);
                    if let Err(e) = self
                        .store
                        .set_version_history(config.documents.version_history)
                        .await
                    {
                        tracing::error!("failed to configure document store: {}", e);
                    }
                    *self.config.write().await = config;
                }
                Err(e) => tracing::warn!("invalid initialization options: {}", e),
            }
        }

        Ok(InitializeResult {
            capabilities: Self::server_capabilities(),
            server_info: Some(ServerInfo {
                name: "razor-lsp".into(),
                version: Some(env!("CARGO_PKG_VERSION").into()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("razor-lsp server initialized");
        self.client
            .log_message(MessageType::INFO, "razor-lsp ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("shutting down razor-lsp server");
        self.shutdown.cancel();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        tracing::info!("document opened: {:?} v{}", doc.uri, doc.version);

        // A reopen restarts versioning, so output kept for the old session
        // would shadow every publication for the new one.
        self.generator.forget(&doc.uri);
        self.coordinator.cache().invalidate(&doc.uri);

        if let Err(e) = self.store.open(doc.uri.clone(), doc.text, doc.version).await {
            tracing::error!("failed to open document {:?}: {}", doc.uri, e);
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let mut changes = params.content_changes;

        // Full sync: the last change carries the whole document.
        let Some(change) = changes.pop() else {
            return;
        };

        if let Err(e) = self.store.change(uri.clone(), change.text, version).await {
            tracing::warn!("failed to process document change {:?}: {}", uri, e);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::info!("document closed: {:?}", uri);

        match self.store.close(uri.clone()).await {
            Ok(_) => self.generator.forget(&uri),
            Err(e) => tracing::error!("failed to close document {:?}: {}", uri, e),
        }
    }
}
