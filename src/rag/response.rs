//! Grounded answers over retrieved chunks.

use super::{context::format_context_for_prompt, ContextBuilder, ContextChunk};
use crate::config::{Prompts, Settings};
use crate::error::{GenSearchError, Result};
use crate::ingest::VectorStoreHandle;
use crate::llm::{ChatMessage, ChatModel, ChatOptions};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub const NO_PROMPT: &str = "No prompt provided.";
pub const NOT_INITIALIZED: &str = "RAG system not initialized. Check server logs.";

/// An answer with the chunks it was grounded on.
#[derive(Debug, Clone)]
pub struct RagResponse {
    pub answer: String,
    pub sources: Vec<ContextChunk>,
}

/// Retriever plus LLM, answering strictly from the indexed document.
pub struct RetrievalChain {
    model: Arc<dyn ChatModel>,
    options: ChatOptions,
    context_builder: ContextBuilder,
    prompts: Prompts,
}

impl RetrievalChain {
    /// Assemble the chain from an ingested collection and an LLM client.
    ///
    /// Returns `None` (and logs why) when either piece is missing.
    pub fn setup(
        handle: Option<VectorStoreHandle>,
        model: Option<Arc<dyn ChatModel>>,
        settings: &Settings,
        prompts: &Prompts,
    ) -> Option<Self> {
        let Some(handle) = handle else {
            error!("Vector store unavailable, RAG chain not created");
            return None;
        };
        let Some(model) = model else {
            warn!("LLM client unavailable, RAG chain not created");
            return None;
        };

        info!(
            "RAG chain ready over collection '{}' (k={})",
            handle.collection(),
            settings.rag.top_k
        );

        Some(Self {
            model,
            options: ChatOptions::new(&settings.rag.model)
                .with_temperature(settings.rag.temperature),
            context_builder: ContextBuilder::new(handle).with_top_k(settings.rag.top_k),
            prompts: prompts.clone(),
        })
    }

    /// Answer `query` from the document.
    pub async fn ask(&self, query: &str) -> Result<String> {
        Ok(self.ask_with_sources(query).await?.answer)
    }

    /// Answer `query` and return the retrieved chunks alongside.
    #[instrument(skip(self, query))]
    pub async fn ask_with_sources(&self, query: &str) -> Result<RagResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GenSearchError::InvalidInput(NO_PROMPT.to_string()));
        }

        info!("Received RAG query ({} chars)", query.len());

        let sources = self.context_builder.build(query).await.map_err(|e| {
            error!("Error retrieving context: {}", e);
            e
        })?;
        debug!("Retrieved {} chunks", sources.len());

        let context = format_context_for_prompt(&sources);
        let messages = [
            ChatMessage::system(self.prompts.rag_system(&context)),
            ChatMessage::user(query),
        ];

        let answer = self
            .model
            .complete(&messages, &self.options)
            .await
            .map_err(|e| {
                error!("Error during RAG invocation: {}", e);
                e
            })?;

        Ok(RagResponse { answer, sources })
    }
}
