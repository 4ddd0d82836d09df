//! Qdrant vector store backend.
//!
//! Chunks are stored as points with cosine distance; text and provenance
//! live in the point payload.

use super::{ChunkRecord, SearchResult, VectorStore};
use crate::error::{GenSearchError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, ScoredPoint,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Points per upsert request.
const UPSERT_BATCH_SIZE: usize = 256;

/// A [`VectorStore`] backed by Qdrant over gRPC.
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    /// Create a client for the Qdrant instance at `url` (e.g. `http://qdrant:6334`).
    ///
    /// No request is made; use [`VectorStore::health_check`] to test connectivity.
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    fn map_err(e: qdrant_client::QdrantError) -> GenSearchError {
        GenSearchError::VectorStore(e.to_string())
    }

    fn to_point(record: &ChunkRecord) -> Result<PointStruct> {
        let payload = Payload::try_from(serde_json::json!({
            "text": record.content,
            "source": record.source,
            "chunk_index": record.chunk_index,
            "indexed_at": record.indexed_at.to_rfc3339(),
        }))
        .map_err(|e| GenSearchError::VectorStore(format!("Invalid payload: {}", e)))?;

        Ok(PointStruct::new(
            record.id.to_string(),
            record.embedding.clone(),
            payload,
        ))
    }

    fn from_scored(point: ScoredPoint) -> SearchResult {
        let payload = &point.payload;

        let id = point
            .id
            .as_ref()
            .and_then(|pid| match &pid.point_id_options {
                Some(PointIdOptions::Uuid(s)) => Uuid::parse_str(s).ok(),
                _ => None,
            })
            .unwrap_or_else(Uuid::nil);

        let indexed_at = string_field(payload, "indexed_at")
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default();

        SearchResult {
            record: ChunkRecord {
                id,
                source: string_field(payload, "source").unwrap_or_default(),
                content: string_field(payload, "text").unwrap_or_default(),
                chunk_index: integer_field(payload, "chunk_index").unwrap_or_default(),
                embedding: Vec::new(),
                indexed_at,
            },
            score: point.score,
        }
    }
}

fn string_field(payload: &HashMap<String, QdrantValue>, key: &str) -> Option<String> {
    match payload.get(key).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    }
}

fn integer_field(payload: &HashMap<String, QdrantValue>, key: &str) -> Option<usize> {
    match payload.get(key).and_then(|v| v.kind.as_ref()) {
        Some(Kind::IntegerValue(n)) => usize::try_from(*n).ok(),
        _ => None,
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn health_check(&self) -> Result<()> {
        let reply = self.client.health_check().await.map_err(Self::map_err)?;
        debug!(version = %reply.version, "qdrant reachable");
        Ok(())
    }

    async fn point_count(&self, collection: &str) -> Result<Option<u64>> {
        if !self
            .client
            .collection_exists(collection)
            .await
            .map_err(Self::map_err)?
        {
            return Ok(None);
        }

        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(Self::map_err)?;

        Ok(Some(response.result.map(|r| r.count).unwrap_or(0)))
    }

    async fn recreate_collection(&self, collection: &str, dimensions: usize) -> Result<()> {
        if self
            .client
            .collection_exists(collection)
            .await
            .map_err(Self::map_err)?
        {
            self.client
                .delete_collection(collection)
                .await
                .map_err(Self::map_err)?;
            debug!(collection, "deleted qdrant collection");
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::map_err)?;

        info!(collection, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[ChunkRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            let points = batch
                .iter()
                .map(Self::to_point)
                .collect::<Result<Vec<_>>>()?;

            self.client
                .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
                .await
                .map_err(Self::map_err)?;
        }

        debug!(collection, count = records.len(), "upserted chunks to qdrant");
        Ok(records.len())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, embedding.to_vec(), limit as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        Ok(response.result.into_iter().map(Self::from_scored).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentChunk;

    #[tokio::test]
    async fn test_client_builds_without_connecting() {
        assert!(QdrantVectorStore::new("http://localhost:6334").is_ok());
    }

    #[test]
    fn test_payload_round_trip() {
        let record = ChunkRecord::new(
            DocumentChunk {
                source: "/app/138.pdf".to_string(),
                content: "Booth 4: John Roe".to_string(),
                chunk_index: 3,
            },
            vec![0.1, 0.2],
        );

        let point = QdrantVectorStore::to_point(&record).unwrap();
        let scored = ScoredPoint {
            id: point.id.clone(),
            payload: point.payload.clone(),
            score: 0.87,
            ..Default::default()
        };

        let result = QdrantVectorStore::from_scored(scored);
        assert_eq!(result.record.id, record.id);
        assert_eq!(result.record.content, "Booth 4: John Roe");
        assert_eq!(result.record.source, "/app/138.pdf");
        assert_eq!(result.record.chunk_index, 3);
        assert!((result.score - 0.87).abs() < f32::EPSILON);
    }
}
