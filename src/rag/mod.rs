//! RAG (Retrieval-Augmented Generation) over the indexed document.
//!
//! Answers questions from retrieved chunks only, falling back to a fixed
//! sentence when the chunks do not contain the answer.

pub mod context;
mod response;

pub use context::ContextBuilder;
pub use response::{RagResponse, RetrievalChain, NO_PROMPT, NOT_INITIALIZED};

use crate::vector_store::SearchResult;

/// A retrieved chunk used as context.
#[derive(Debug, Clone)]
pub struct ContextChunk {
    /// Position of the chunk in the source document.
    pub chunk_index: usize,
    /// Text content.
    pub content: String,
    /// Similarity score.
    pub score: f32,
}

impl From<SearchResult> for ContextChunk {
    fn from(result: SearchResult) -> Self {
        Self {
            chunk_index: result.record.chunk_index,
            content: result.record.content,
            score: result.score,
        }
    }
}
