//! [`LlmClient`] backed by openai-client.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use prompt::ChatMessage;
use tracing::instrument;

use super::{to_openai_messages, LlmClient};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI (or compatible endpoint) implementation of [`LlmClient`].
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: openai_client::OpenAIClient,
    model: String,
}

impl OpenAILlmClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string(), timeout)
    }

    pub fn with_base_url(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: openai_client::OpenAIClient::new(api_key, base_url, timeout)?,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, messages), fields(model = %self.model))]
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let openai_messages = to_openai_messages(&messages)?;
        self.client.chat_completion(&self.model, openai_messages).await
    }

    #[instrument(skip(self, messages), fields(model = %self.model))]
    async fn complete_json(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let openai_messages = to_openai_messages(&messages)?;
        self.client
            .chat_completion_json(&self.model, openai_messages)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_model() {
        let client = OpenAILlmClient::new("sk-test-key-123456".to_string(), Duration::from_secs(5))
            .unwrap()
            .with_model("gpt-4o");
        assert_eq!(client.model(), "gpt-4o");
    }

    #[test]
    fn test_default_model() {
        let client = OpenAILlmClient::with_base_url(
            "sk-test-key-123456".to_string(),
            "http://127.0.0.1:9/v1".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
    }
}
