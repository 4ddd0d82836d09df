//! Vector store abstraction for gensearch.
//!
//! Provides a trait-based interface over collections of embedded document chunks.

mod memory;
mod qdrant;

pub use memory::MemoryVectorStore;
pub use qdrant::QdrantVectorStore;

use crate::document::DocumentChunk;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A chunk stored in the vector database.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    /// Unique point ID.
    pub id: Uuid,
    /// Document the chunk was cut from.
    pub source: String,
    /// Text content of this chunk.
    pub content: String,
    /// Position of the chunk in the split sequence.
    pub chunk_index: usize,
    /// Embedding vector. Empty on records returned by a search.
    pub embedding: Vec<f32>,
    /// When this chunk was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl ChunkRecord {
    /// Create a record for an embedded chunk.
    pub fn new(chunk: DocumentChunk, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: chunk.source,
            content: chunk.content,
            chunk_index: chunk.chunk_index,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched chunk.
    pub record: ChunkRecord,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Check that the backend is reachable.
    async fn health_check(&self) -> Result<()>;

    /// Number of points in `collection`, or `None` if it does not exist.
    async fn point_count(&self, collection: &str) -> Result<Option<u64>>;

    /// Drop `collection` if present and create it empty with cosine distance.
    async fn recreate_collection(&self, collection: &str, dimensions: usize) -> Result<()>;

    /// Write records into `collection`. Returns the number written.
    async fn upsert(&self, collection: &str, records: &[ChunkRecord]) -> Result<usize>;

    /// Nearest `limit` records to `embedding`, best first.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_record_from_chunk() {
        let chunk = DocumentChunk {
            source: "/app/138.pdf".to_string(),
            content: "Jane Doe".to_string(),
            chunk_index: 7,
        };
        let record = ChunkRecord::new(chunk, vec![0.5; 4]);
        assert_eq!(record.chunk_index, 7);
        assert_eq!(record.content, "Jane Doe");
        assert_eq!(record.embedding.len(), 4);
    }
}
