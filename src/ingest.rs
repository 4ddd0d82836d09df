//! Idempotent indexing of the source document.
//!
//! A populated collection is never rewritten unless a reset is requested, so
//! running ingestion on every start costs one count query after the first
//! successful run. A count that cannot be read aborts the run rather than
//! risk dropping a populated collection. The check is read-then-write: two
//! processes starting against an empty collection at the same time can both
//! ingest.

use crate::config::Settings;
use crate::document::{load_document, SplitterConfig, TextSplitter};
use crate::embedding::Embedder;
use crate::error::{GenSearchError, Result};
use crate::vector_store::{ChunkRecord, SearchResult, VectorStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// A collection ready for similarity search, paired with the embedder that filled it.
#[derive(Clone)]
pub struct VectorStoreHandle {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    collection: String,
}

impl VectorStoreHandle {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>, collection: &str) -> Self {
        Self {
            store,
            embedder,
            collection: collection.to_string(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Embed `query` and return the `k` nearest chunks.
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let embedding = self.embedder.embed(query).await?;
        self.store.search(&self.collection, &embedding, k).await
    }
}

/// How a successful ingestion run ended.
pub enum IngestOutcome {
    /// The collection already held points; nothing was written.
    Skipped {
        handle: VectorStoreHandle,
        points: u64,
    },
    /// The collection was (re)created and filled.
    Ingested {
        handle: VectorStoreHandle,
        chunks: usize,
    },
}

impl IngestOutcome {
    pub fn into_handle(self) -> VectorStoreHandle {
        match self {
            IngestOutcome::Skipped { handle, .. } | IngestOutcome::Ingested { handle, .. } => {
                handle
            }
        }
    }
}

/// Loads, chunks, embeds and indexes one document.
pub struct IngestionPipeline {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    collection: String,
    dimensions: usize,
    splitter: TextSplitter,
    source_path: PathBuf,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        settings: &Settings,
    ) -> Self {
        Self {
            store,
            embedder,
            collection: settings.vector_store.collection.clone(),
            dimensions: settings.embedding.dimensions as usize,
            splitter: TextSplitter::new(SplitterConfig {
                chunk_size: settings.ingestion.chunk_size,
                chunk_overlap: settings.ingestion.chunk_overlap,
            }),
            source_path: settings.source_path(),
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    fn handle(&self) -> VectorStoreHandle {
        VectorStoreHandle::new(self.store.clone(), self.embedder.clone(), &self.collection)
    }

    /// Startup entry point: run ingestion and turn any failure into `None`.
    pub async fn ingest(&self) -> Option<VectorStoreHandle> {
        match self.run(false).await {
            Ok(outcome) => Some(outcome.into_handle()),
            Err(e) => {
                error!("Ingestion failed, RAG will not function: {}", e);
                None
            }
        }
    }

    /// Index the source document unless the collection is already populated.
    ///
    /// With `reset`, the populated check is skipped and the collection is rebuilt.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn run(&self, reset: bool) -> Result<IngestOutcome> {
        if !self.source_path.exists() {
            return Err(GenSearchError::Document(format!(
                "Source document not found at {}",
                self.source_path.display()
            )));
        }

        self.embedder.warm_up().await?;

        self.store.health_check().await.map_err(|e| {
            GenSearchError::VectorStore(format!("Could not connect to vector store: {}", e))
        })?;

        if reset {
            info!("Reset requested, rebuilding collection '{}'", self.collection);
        } else {
            match self.store.point_count(&self.collection).await {
                Ok(Some(points)) if points > 0 => {
                    info!(
                        "Collection '{}' populated ({} points). Skipping ingestion.",
                        self.collection, points
                    );
                    return Ok(IngestOutcome::Skipped {
                        handle: self.handle(),
                        points,
                    });
                }
                Ok(Some(_)) => info!("Collection '{}' is empty. Ingesting.", self.collection),
                Ok(None) => info!("Collection '{}' does not exist. Ingesting.", self.collection),
                Err(e) => {
                    return Err(GenSearchError::VectorStore(format!(
                        "Could not read collection '{}': {}",
                        self.collection, e
                    )))
                }
            }
        }

        let chunks = self.index().await?;
        Ok(IngestOutcome::Ingested {
            handle: self.handle(),
            chunks,
        })
    }

    async fn index(&self) -> Result<usize> {
        info!("Starting document ingestion and indexing...");

        let document = load_document(&self.source_path).await?;
        let chunks = self.splitter.split(&document);
        if chunks.is_empty() {
            return Err(GenSearchError::Document(format!(
                "No text extracted from {}",
                document.source
            )));
        }
        debug!("Split document into {} chunks", chunks.len());

        self.store
            .recreate_collection(&self.collection, self.dimensions)
            .await?;

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(GenSearchError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let records: Vec<ChunkRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| ChunkRecord::new(chunk, embedding))
            .collect();

        let written = self.store.upsert(&self.collection, &records).await?;
        info!("Document ingestion complete: {} chunks indexed", written);
        Ok(written)
    }
}
