//! In-process sentence embeddings with a BERT model (all-MiniLM-L6-v2 by default).
//!
//! The model directory is the layout written by sentence-transformers:
//! `config.json`, `tokenizer.json` and `model.safetensors` (or
//! `pytorch_model.bin`). Weights are loaded on first use and shared.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{GenSearchError, Result};
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

/// Longest input in tokens; the rest of a chunk is ignored, as sentence-transformers does.
const MAX_SEQ_LEN: usize = 256;

struct LoadedModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

/// Embedder running a local BERT model on the CPU.
pub struct LocalEmbedder {
    model_dir: PathBuf,
    dimensions: usize,
    batch_size: usize,
    loaded: OnceCell<Arc<LoadedModel>>,
}

impl LocalEmbedder {
    pub fn new(model_dir: impl Into<PathBuf>, dimensions: usize, batch_size: usize) -> Self {
        Self {
            model_dir: model_dir.into(),
            dimensions,
            batch_size: batch_size.max(1),
            loaded: OnceCell::new(),
        }
    }

    /// Create an embedder from settings. Nothing is read until the first call.
    pub fn from_settings(settings: &EmbeddingSettings) -> Self {
        Self::new(
            PathBuf::from(shellexpand::tilde(&settings.model_path).to_string()),
            settings.dimensions as usize,
            settings.batch_size,
        )
    }

    async fn model(&self) -> Result<Arc<LoadedModel>> {
        self.loaded
            .get_or_try_init(|| async {
                let dir = self.model_dir.clone();
                let dimensions = self.dimensions;
                tokio::task::spawn_blocking(move || load_model(&dir, dimensions))
                    .await
                    .map_err(|e| {
                        GenSearchError::Embedding(format!("Model load task failed: {}", e))
                    })?
                    .map(Arc::new)
            })
            .await
            .cloned()
    }
}

fn load_model(dir: &Path, dimensions: usize) -> Result<LoadedModel> {
    if !dir.is_dir() {
        return Err(GenSearchError::Embedding(format!(
            "Embedding model directory not found at {}",
            dir.display()
        )));
    }
    info!("Loading embedding model from {}", dir.display());

    let raw = std::fs::read_to_string(dir.join("config.json"))?;
    let config: BertConfig = serde_json::from_str(&raw)?;
    if config.hidden_size != dimensions {
        return Err(GenSearchError::Config(format!(
            "Embedding model produces {} dimensions, expected {}",
            config.hidden_size, dimensions
        )));
    }

    let mut tokenizer = Tokenizer::from_file(dir.join("tokenizer.json"))
        .map_err(|e| GenSearchError::Embedding(format!("Failed to load tokenizer: {}", e)))?;
    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        ..Default::default()
    }));
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: MAX_SEQ_LEN,
            ..Default::default()
        }))
        .map_err(|e| GenSearchError::Embedding(format!("Invalid truncation: {}", e)))?;

    let device = Device::Cpu;
    let safetensors = dir.join("model.safetensors");
    let vb = if safetensors.exists() {
        // SAFETY: the weights file is not modified while the model is alive
        unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, &device)? }
    } else {
        VarBuilder::from_pth(dir.join("pytorch_model.bin"), DType::F32, &device)?
    };
    let model = BertModel::load(vb, &config)?;

    Ok(LoadedModel {
        model,
        tokenizer,
        device,
    })
}

impl LoadedModel {
    fn encode(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let encodings = self
            .tokenizer
            .encode_batch(texts, true)
            .map_err(|e| GenSearchError::Embedding(format!("Tokenization failed: {}", e)))?;

        let ids = encodings
            .iter()
            .map(|e| Tensor::new(e.get_ids(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let masks = encodings
            .iter()
            .map(|e| Tensor::new(e.get_attention_mask(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;

        let input_ids = Tensor::stack(&ids, 0)?;
        let attention_mask = Tensor::stack(&masks, 0)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = normalize(&mean_pool(&hidden, &attention_mask)?)?;
        Ok(pooled.to_vec2::<f32>()?)
    }
}

/// Average token vectors, ignoring padding. `hidden` is (batch, tokens, dims).
fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Tensor> {
    let mask = attention_mask.to_dtype(hidden.dtype())?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;
    summed.broadcast_div(&counts)
}

/// Scale each row to unit length.
fn normalize(v: &Tensor) -> candle_core::Result<Tensor> {
    let norm = v.sqr()?.sum_keepdim(1)?.sqrt()?.clamp(1e-12, f64::MAX)?;
    v.broadcast_div(&norm)
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn warm_up(&self) -> Result<()> {
        self.model().await.map(|_| ())
    }

    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| GenSearchError::Embedding("Empty embedding output".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.model().await?;

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let model = model.clone();
            let batch = batch.to_vec();
            let vectors = tokio::task::spawn_blocking(move || model.encode(batch))
                .await
                .map_err(|e| {
                    GenSearchError::Embedding(format!("Embedding task failed: {}", e))
                })??;
            embeddings.extend(vectors);
        }

        debug!("Embedded {} texts locally", embeddings.len());
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
