//! Error types for gensearch.

use thiserror::Error;

/// Library-level error type for gensearch operations.
#[derive(Error, Debug)]
pub enum GenSearchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    NotInitialized(String),

    #[error("LLM provider error: {0}")]
    Provider(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Embedding model error: {0}")]
    Candle(#[from] candle_core::Error),
}

/// Coarse classification used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something unusable.
    Input,
    /// A required component is missing or was never set up.
    Config,
    /// A collaborator (LLM, embeddings, vector store, parser) failed.
    Upstream,
}

impl GenSearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenSearchError::InvalidInput(_) => ErrorKind::Input,
            GenSearchError::Config(_)
            | GenSearchError::Unavailable(_)
            | GenSearchError::NotInitialized(_)
            | GenSearchError::TomlParse(_) => ErrorKind::Config,
            _ => ErrorKind::Upstream,
        }
    }
}

/// Result type alias for gensearch operations.
pub type Result<T> = std::result::Result<T, GenSearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            GenSearchError::InvalidInput("No prompt provided.".into()).kind(),
            ErrorKind::Input
        );
        assert_eq!(
            GenSearchError::NotInitialized("not ready".into()).kind(),
            ErrorKind::Config
        );
        assert_eq!(
            GenSearchError::Provider("timeout".into()).kind(),
            ErrorKind::Upstream
        );
    }

    #[test]
    fn test_input_message_is_verbatim() {
        let err = GenSearchError::InvalidInput("Missing 'prompt' in JSON body".into());
        assert_eq!(err.to_string(), "Missing 'prompt' in JSON body");
    }
}
