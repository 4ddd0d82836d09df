//! Chat completions over an OpenAI-compatible API (Groq by default).

use super::{ChatMessage, ChatModel, ChatOptions, Role};
use crate::config::LlmSettings;
use crate::error::{GenSearchError, Result};
use crate::openai::create_client_with_timeout;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Chat model backed by an OpenAI-compatible endpoint.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
}

impl OpenAIChatModel {
    /// Build a client from settings.
    ///
    /// Fails with [`GenSearchError::Unavailable`] when no API key is configured.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        let api_key = settings.api_key().ok_or_else(|| {
            GenSearchError::Unavailable("LLM API key (GROQ_API_KEY) is not set".to_string())
        })?;

        let client = create_client_with_timeout(
            &settings.api_base,
            api_key,
            Duration::from_secs(settings.timeout_secs),
        )?;

        Ok(Self { client })
    }

    fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
        let built: std::result::Result<ChatCompletionRequestMessage, _> = match message.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map(Into::into),
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map(Into::into),
        };
        built.map_err(|e| GenSearchError::Provider(format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip(self, messages), fields(model = %options.model, count = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage], options: &ChatOptions) -> Result<String> {
        let messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = match options.temperature {
            Some(temperature) => CreateChatCompletionRequestArgs::default()
                .model(&options.model)
                .messages(messages)
                .temperature(temperature)
                .build(),
            None => CreateChatCompletionRequestArgs::default()
                .model(&options.model)
                .messages(messages)
                .build(),
        }
        .map_err(|e| GenSearchError::Provider(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| GenSearchError::Provider(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GenSearchError::Provider("Empty response from LLM".to_string()))?;

        debug!("Received {} characters from LLM", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_unavailable() {
        let settings = LlmSettings::default();
        let err = OpenAIChatModel::from_settings(&settings).err().unwrap();
        assert!(matches!(err, GenSearchError::Unavailable(_)));
    }

    #[test]
    fn test_builds_with_key() {
        let settings = LlmSettings {
            api_key: Some("gsk-test".to_string()),
            ..LlmSettings::default()
        };
        assert!(OpenAIChatModel::from_settings(&settings).is_ok());
    }

    #[test]
    fn test_message_conversion() {
        let msg = OpenAIChatModel::to_request_message(&ChatMessage::system("be brief")).unwrap();
        assert!(matches!(msg, ChatCompletionRequestMessage::System(_)));
        let msg = OpenAIChatModel::to_request_message(&ChatMessage::user("hi")).unwrap();
        assert!(matches!(msg, ChatCompletionRequestMessage::User(_)));
    }
}
