//! Configuration module for gensearch.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{GeneratePrompts, Prompts, RagPrompts, NOT_FOUND_ANSWER};
pub use settings::{
    EmbeddingSettings, GenerateSettings, GeneralSettings, IngestionSettings, LlmSettings,
    PromptSettings, RagSettings, ServerSettings, Settings, VectorStoreSettings,
};
