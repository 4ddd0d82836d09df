//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, ChunkRecord, SearchResult, VectorStore};
use crate::error::{GenSearchError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Collection {
    dimensions: usize,
    records: HashMap<String, ChunkRecord>,
}

/// In-memory vector store.
#[derive(Debug, Default)]
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
    writes: AtomicUsize,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutating calls (recreate or upsert) made so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Collection>>> {
        self.collections
            .read()
            .map_err(|_| GenSearchError::VectorStore("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Collection>>> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.collections
            .write()
            .map_err(|_| GenSearchError::VectorStore("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    async fn point_count(&self, collection: &str) -> Result<Option<u64>> {
        let collections = self.read()?;
        Ok(collections.get(collection).map(|c| c.records.len() as u64))
    }

    async fn recreate_collection(&self, collection: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.write()?;
        collections.insert(
            collection.to_string(),
            Collection {
                dimensions,
                records: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[ChunkRecord]) -> Result<usize> {
        let mut collections = self.write()?;
        let target = collections.get_mut(collection).ok_or_else(|| {
            GenSearchError::VectorStore(format!("Collection '{}' does not exist", collection))
        })?;

        for record in records {
            if record.embedding.len() != target.dimensions {
                return Err(GenSearchError::VectorStore(format!(
                    "Vector of size {} does not match collection size {}",
                    record.embedding.len(),
                    target.dimensions
                )));
            }
        }
        for record in records {
            target.records.insert(record.id.to_string(), record.clone());
        }
        Ok(records.len())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.read()?;
        let target = collections.get(collection).ok_or_else(|| {
            GenSearchError::VectorStore(format!("Collection '{}' does not exist", collection))
        })?;

        let mut results: Vec<SearchResult> = target
            .records
            .values()
            .map(|record| SearchResult {
                score: cosine_similarity(embedding, &record.embedding),
                record: ChunkRecord {
                    embedding: Vec::new(),
                    ..record.clone()
                },
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }
}
