//! Context building for RAG responses.

use super::ContextChunk;
use crate::error::Result;
use crate::ingest::VectorStoreHandle;

/// Builds context from nearest-neighbour search results.
pub struct ContextBuilder {
    handle: VectorStoreHandle,
    top_k: usize,
}

impl ContextBuilder {
    /// Create a new context builder retrieving 5 chunks per query.
    pub fn new(handle: VectorStoreHandle) -> Self {
        Self { handle, top_k: 5 }
    }

    /// Set the number of chunks retrieved per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Retrieve context chunks for a query, best match first.
    pub async fn build(&self, query: &str) -> Result<Vec<ContextChunk>> {
        let results = self.handle.similarity_search(query, self.top_k).await?;
        Ok(results.into_iter().map(ContextChunk::from).collect())
    }
}

/// Join chunk texts into the context block placed in the system prompt.
pub fn format_context_for_prompt(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
