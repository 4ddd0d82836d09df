//! Test-only mock chat model.

use super::{ChatMessage, ChatModel, ChatOptions};
use crate::error::{GenSearchError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Returns canned replies and records every call.
#[derive(Debug, Clone)]
pub struct MockChatModel {
    reply: Option<String>,
    calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl MockChatModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, messages: &[ChatMessage], _options: &ChatOptions) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.reply
            .clone()
            .ok_or_else(|| GenSearchError::Provider("mock LLM error".to_string()))
    }
}
