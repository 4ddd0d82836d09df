//! Embedding generation for semantic search and retrieval.

mod local;
mod openai;
#[cfg(test)]
pub mod mock;

pub use local::LocalEmbedder;
pub use openai::OpenAIEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding generation.
///
/// Ingestion and retrieval must share one implementation so document and
/// query vectors live in the same space.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Load whatever the embedder needs before first use. Remote embedders have nothing to do.
    async fn warm_up(&self) -> Result<()> {
        Ok(())
    }

    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}
