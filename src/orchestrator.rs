//! Startup orchestration for gensearch.
//!
//! Builds the clients from settings, runs startup ingestion and assembles the
//! state the HTTP router serves from.

use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, LocalEmbedder, OpenAIEmbedder};
use crate::error::{GenSearchError, Result};
use crate::generate::PromptResponder;
use crate::ingest::{IngestOutcome, IngestionPipeline};
use crate::llm::{ChatModel, OpenAIChatModel};
use crate::rag::RetrievalChain;
use crate::server::AppState;
use crate::vector_store::{MemoryVectorStore, QdrantVectorStore, VectorStore};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Owns the shared clients and wires them into the two services.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    chat_model: Option<Arc<dyn ChatModel>>,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
}

impl Orchestrator {
    /// Create an orchestrator from settings.
    ///
    /// A missing LLM key is not fatal: the LLM-backed services report
    /// themselves unavailable instead.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;

        let chat_model: Option<Arc<dyn ChatModel>> =
            match OpenAIChatModel::from_settings(&settings.llm) {
                Ok(model) => {
                    info!("LLM client initialized ({})", settings.llm.api_base);
                    Some(Arc::new(model))
                }
                Err(e) => {
                    warn!("{}. LLM endpoints will be unavailable.", e);
                    None
                }
            };

        let embedder = create_embedder(&settings)?;
        let vector_store = create_vector_store(&settings)?;

        Ok(Self::with_components(
            settings,
            prompts,
            chat_model,
            embedder,
            vector_store,
        ))
    }

    /// Create an orchestrator from already-built components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        chat_model: Option<Arc<dyn ChatModel>>,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            settings,
            prompts,
            chat_model,
            embedder,
            vector_store,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn has_chat_model(&self) -> bool {
        self.chat_model.is_some()
    }

    /// The word-capped passthrough service.
    pub fn responder(&self) -> PromptResponder {
        PromptResponder::new(self.chat_model.clone(), &self.settings, &self.prompts)
    }

    pub fn pipeline(&self) -> IngestionPipeline {
        IngestionPipeline::new(
            self.vector_store.clone(),
            self.embedder.clone(),
            &self.settings,
        )
    }

    /// Run ingestion, surfacing failures to the caller.
    pub async fn ingest(&self, reset: bool) -> Result<IngestOutcome> {
        self.pipeline().run(reset).await
    }

    /// Ingest if needed and build the retrieval chain. `None` when RAG cannot run.
    pub async fn retrieval_chain(&self) -> Option<RetrievalChain> {
        let handle = self.pipeline().ingest().await;
        RetrievalChain::setup(handle, self.chat_model.clone(), &self.settings, &self.prompts)
    }

    /// Build the full server state. Never fails; unavailable parts are recorded as such.
    #[instrument(skip(self))]
    pub async fn start(&self) -> AppState {
        let responder = self.responder();
        let rag = self.retrieval_chain().await;

        info!(
            "Startup complete (simple_llm_ready={}, rag_ready={})",
            responder.is_ready(),
            rag.is_some()
        );

        AppState { responder, rag }
    }
}

/// Create the configured embedder. The local model is loaded on first use.
pub fn create_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    match settings.embedding.provider.as_str() {
        "local" => {
            info!(
                "Using local embedding model at {}",
                settings.embedding_model_path().display()
            );
            Ok(Arc::new(LocalEmbedder::from_settings(&settings.embedding)))
        }
        "openai" => {
            info!("Using embeddings server at {}", settings.embedding.api_base);
            Ok(Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?))
        }
        other => Err(GenSearchError::Config(format!(
            "Unknown embedding provider '{}' (expected local or openai)",
            other
        ))),
    }
}

/// Create the configured vector store client.
pub fn create_vector_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    match settings.vector_store.provider.as_str() {
        "qdrant" => {
            let url = settings.vector_store.url();
            info!("Using Qdrant at {}", url);
            Ok(Arc::new(QdrantVectorStore::new(&url)?))
        }
        "memory" => {
            warn!("Using in-memory vector store; the index is rebuilt on every start");
            Ok(Arc::new(MemoryVectorStore::new()))
        }
        other => Err(GenSearchError::Config(format!(
            "Unknown vector store provider '{}' (expected qdrant or memory)",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::mock::MockEmbedder;
    use crate::llm::mock::MockChatModel;
    use std::path::Path;

    fn settings_for(path: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.vector_store.provider = "memory".to_string();
        settings.ingestion.source_path = path.display().to_string();
        settings.ingestion.chunk_size = 80;
        settings.ingestion.chunk_overlap = 10;
        settings.embedding.dimensions = 16;
        settings
    }

    fn orchestrator(settings: Settings, model: Option<MockChatModel>) -> Orchestrator {
        Orchestrator::with_components(
            settings,
            Prompts::default(),
            model.map(|m| Arc::new(m) as Arc<dyn ChatModel>),
            Arc::new(MockEmbedder::new(16)),
            Arc::new(MemoryVectorStore::new()),
        )
    }

    #[tokio::test]
    async fn test_start_with_everything_available() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roll.md");
        std::fs::write(&path, "# Ward 3\n\nSerial 1 voter A\nSerial 2 voter B\n").unwrap();

        let orch = orchestrator(settings_for(&path), Some(MockChatModel::replying("ok")));
        let state = orch.start().await;
        assert!(state.responder.is_ready());
        assert!(state.rag.is_some());
    }

    #[tokio::test]
    async fn test_missing_source_disables_rag_only() {
        let orch = orchestrator(
            settings_for(Path::new("/nonexistent/138.pdf")),
            Some(MockChatModel::replying("ok")),
        );
        let state = orch.start().await;
        assert!(state.responder.is_ready());
        assert!(state.rag.is_none());
    }

    #[tokio::test]
    async fn test_missing_llm_disables_both() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roll.txt");
        std::fs::write(&path, "Serial 1 voter A").unwrap();

        let orch = orchestrator(settings_for(&path), None);
        assert!(!orch.has_chat_model());
        let state = orch.start().await;
        assert!(!state.responder.is_ready());
        assert!(state.rag.is_none());
    }

    #[test]
    fn test_new_without_api_key() {
        let mut settings = Settings::default();
        settings.vector_store.provider = "memory".to_string();
        settings.llm.api_key = None;

        let orch = Orchestrator::new(settings).unwrap();
        assert!(!orch.has_chat_model());
    }

    #[test]
    fn test_embedding_provider_selection() {
        let mut settings = Settings::default();
        assert_eq!(create_embedder(&settings).unwrap().dimensions(), 384);

        settings.embedding.provider = "openai".to_string();
        assert!(create_embedder(&settings).is_ok());

        settings.embedding.provider = "onnx".to_string();
        assert!(matches!(
            create_embedder(&settings),
            Err(GenSearchError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let mut settings = Settings::default();
        settings.vector_store.provider = "pinecone".to_string();
        assert!(matches!(
            create_vector_store(&settings),
            Err(GenSearchError::Config(_))
        ));
    }
}
