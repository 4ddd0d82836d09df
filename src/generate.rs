//! Word-capped passthrough to the hosted LLM.

use crate::config::{Prompts, Settings};
use crate::error::{GenSearchError, Result};
use crate::llm::{ChatMessage, ChatModel, ChatOptions};
use std::sync::Arc;
use tracing::{error, info, instrument};

pub const MISSING_PROMPT: &str = "Missing 'prompt' in JSON body";
pub const LLM_UNAVAILABLE: &str =
    "GROQ API key not set or Groq client unavailable on the server.";

/// Forwards prompts to the LLM under a fixed brevity instruction and enforces the word cap.
pub struct PromptResponder {
    model: Option<Arc<dyn ChatModel>>,
    model_name: String,
    max_words: usize,
    system: String,
}

impl PromptResponder {
    /// `model` is `None` when the client could not be built (e.g. missing API key).
    pub fn new(model: Option<Arc<dyn ChatModel>>, settings: &Settings, prompts: &Prompts) -> Self {
        Self {
            model,
            model_name: settings.generate.model.clone(),
            max_words: settings.generate.max_words,
            system: prompts.generate_system(settings.generate.max_words),
        }
    }

    /// Whether a client is available.
    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    /// Answer `prompt` in at most `max_words` words.
    #[instrument(skip(self, prompt))]
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenSearchError::InvalidInput(MISSING_PROMPT.to_string()));
        }

        let model = self
            .model
            .as_ref()
            .ok_or_else(|| GenSearchError::Unavailable(LLM_UNAVAILABLE.to_string()))?;

        info!("Received generation prompt ({} chars)", prompt.len());

        let messages = [ChatMessage::system(&self.system), ChatMessage::user(prompt)];
        let raw = model
            .complete(&messages, &ChatOptions::new(&self.model_name))
            .await
            .map_err(|e| {
                error!("Error calling LLM provider: {}", e);
                e
            })?;

        Ok(truncate_words(&raw, self.max_words))
    }
}

/// Keep at most `max_words` whitespace-separated words.
///
/// Over the cap, the first `max_words` words are joined by single spaces;
/// otherwise the trimmed input is returned unchanged.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > max_words {
        words[..max_words].join(" ")
    } else {
        text.trim().to_string()
    }
}
