//! Embeddings over an OpenAI-compatible `/embeddings` endpoint.
//!
//! Pointed by default at a self-hosted server running a 384-dimension
//! sentence-transformers model.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{GenSearchError, Result};
use crate::openai::create_client;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI-compatible embedder.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

impl OpenAIEmbedder {
    /// Create an embedder from settings.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        let api_key = settings.api_key.as_deref().unwrap_or_default();
        Ok(Self {
            client: create_client(&settings.api_base, api_key)?,
            model: settings.model.clone(),
            dimensions: settings.dimensions as usize,
            batch_size: settings.batch_size.max(1),
        })
    }

    fn check_dimensions(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(GenSearchError::Embedding(format!(
                "Model '{}' returned {} dimensions, expected {}",
                self.model,
                embedding.len(),
                self.dimensions
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| GenSearchError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()))
                .build()
                .map_err(|e| GenSearchError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| GenSearchError::Embedding(format!("Embedding API error: {}", e)))?;

            if response.data.len() != chunk.len() {
                return Err(GenSearchError::Embedding(format!(
                    "Requested {} embeddings, received {}",
                    chunk.len(),
                    response.data.len()
                )));
            }

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            for embedding_data in embeddings {
                self.check_dimensions(&embedding_data.embedding)?;
                all_embeddings.push(embedding_data.embedding);
            }
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder = OpenAIEmbedder::from_settings(&EmbeddingSettings::default()).unwrap();
        assert_eq!(embedder.dimensions(), 384);

        let settings = EmbeddingSettings {
            dimensions: 768,
            batch_size: 0,
            ..EmbeddingSettings::default()
        };
        let embedder = OpenAIEmbedder::from_settings(&settings).unwrap();
        assert_eq!(embedder.dimensions(), 768);
        assert_eq!(embedder.batch_size, 1);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let embedder = OpenAIEmbedder::from_settings(&EmbeddingSettings::default()).unwrap();
        assert!(embedder.check_dimensions(&vec![0.0; 384]).is_ok());
        let err = embedder.check_dimensions(&vec![0.0; 1536]).unwrap_err();
        assert!(err.to_string().contains("1536"));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let embedder = OpenAIEmbedder::from_settings(&EmbeddingSettings::default()).unwrap();
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
    }
}
