//! Chat completion against a hosted LLM.

mod openai;
#[cfg(test)]
pub mod mock;

pub use openai::OpenAIChatModel;

use crate::error::Result;
use async_trait::async_trait;

/// Message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Per-call generation options.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub model: String,
    /// `None` leaves the provider default.
    pub temperature: Option<f32>,
}

impl ChatOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Trait for chat completion providers.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send `messages` and return the text of the first choice.
    async fn complete(&self, messages: &[ChatMessage], options: &ChatOptions) -> Result<String>;
}
