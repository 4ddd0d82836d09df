//! Configuration settings for gensearch.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub generate: GenerateSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub ingestion: IngestionSettings,
    pub rag: RagSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl GeneralSettings {
    /// Tracing filter for the crate. Each `-v` raises the level past the configured one.
    pub fn log_filter(&self, verbose: u8) -> String {
        let level = match verbose {
            0 => self.log_level.trim(),
            1 => "debug",
            _ => "trace",
        };
        let level = if level.is_empty() { "info" } else { level };
        format!("gensearch={}", level)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

/// Hosted LLM provider settings (any OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of the chat completions API.
    pub api_base: String,
    /// API key. Never written back to disk.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            timeout_secs: 300,
        }
    }
}

impl LlmSettings {
    /// The API key, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Word-capped passthrough settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateSettings {
    /// Model used by `/generate`.
    pub model: String,
    /// Hard cap on returned words.
    pub max_words: usize,
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            model: "llama-3.1-8b-instant".to_string(),
            max_words: 20,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding backend: `local` (in-process BERT) or `openai` (HTTP server).
    pub provider: String,
    /// Directory holding `config.json`, `tokenizer.json` and the weights (local provider).
    pub model_path: String,
    /// Base URL of an OpenAI-compatible embeddings server.
    pub api_base: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Texts per embeddings request.
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            model_path: "/app/embeddings_model".to_string(),
            api_base: "http://embeddings:8080/v1".to_string(),
            api_key: None,
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            batch_size: 64,
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (qdrant, memory).
    pub provider: String,
    /// Qdrant host.
    pub host: String,
    /// Qdrant gRPC port.
    pub port: u16,
    /// Collection holding the document chunks.
    pub collection: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "qdrant".to_string(),
            host: "qdrant".to_string(),
            port: 6334,
            collection: "electoral_list_rag".to_string(),
        }
    }
}

impl VectorStoreSettings {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Source document ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionSettings {
    /// Document to index at startup.
    pub source_path: String,
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            source_path: "/app/138.pdf".to_string(),
            chunk_size: 1500,
            chunk_overlap: 200,
        }
    }
}

/// RAG (Retrieval-Augmented Generation) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// LLM model for answer generation.
    pub model: String,
    /// Number of chunks retrieved per query.
    pub top_k: usize,
    pub temperature: f32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            model: "llama3-8b-8192".to_string(),
            top_k: 5,
            temperature: 0.0,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file, then apply environment overrides.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply overrides from an environment-like lookup. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GROQ_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(base) = get("LLM_API_BASE") {
            self.llm.api_base = base;
        }
        if let Some(host) = get("QDRANT_HOST") {
            self.vector_store.host = host;
        }
        if let Some(port) = get("QDRANT_PORT").and_then(|p| p.trim().parse().ok()) {
            self.vector_store.port = port;
        }
        if let Some(provider) = get("EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }
        if let Some(path) = get("EMBEDDING_MODEL_PATH") {
            self.embedding.model_path = path;
        }
        if let Some(base) = get("EMBEDDING_API_BASE") {
            self.embedding.api_base = base;
        }
        if let Some(key) = get("EMBEDDING_API_KEY") {
            self.embedding.api_key = Some(key);
        }
        if let Some(path) = get("SOURCE_DOCUMENT") {
            self.ingestion.source_path = path;
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::GenSearchError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gensearch")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded local embedding model directory.
    pub fn embedding_model_path(&self) -> PathBuf {
        Self::expand_path(&self.embedding.model_path)
    }

    /// Get the expanded source document path.
    pub fn source_path(&self) -> PathBuf {
        Self::expand_path(&self.ingestion.source_path)
    }
}
