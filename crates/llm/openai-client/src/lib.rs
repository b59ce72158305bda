//! # OpenAI API client
//!
//! Thin wrapper around [async-openai] for chat completion. Two request shapes are offered:
//! free text ([`OpenAIClient::chat_completion`]) and JSON-object mode
//! ([`OpenAIClient::chat_completion_json`]) where the model must answer with one JSON object.

use async_openai::types::{CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ResponseFormat};
use async_openai::{config::OpenAIConfig, Client};
use std::sync::Arc;
use std::time::Duration;

pub use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};

/// Masks an API key for safe logging: first 7 chars + "***" + last 4 chars.
/// Keys of 11 chars or fewer are fully masked.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

/// OpenAI chat client. Holds the API key only for masked logging.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Arc<Client<OpenAIConfig>>,
    api_key_for_logging: String,
}

impl OpenAIClient {
    /// Builds a client for `base_url` (OpenAI or a compatible endpoint) with a per-request timeout.
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.clone())
            .with_api_base(base_url);
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        let client = Client::with_config(config).with_http_client(http_client);
        Ok(Self {
            client: Arc::new(client),
            api_key_for_logging: api_key,
        })
    }

    /// Sends a chat completion request and returns the first choice's text.
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> anyhow::Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()?;
        self.send(request, "chat_completion").await
    }

    /// Same as [`Self::chat_completion`] with `response_format = json_object`; the returned text
    /// is the model's JSON (not yet parsed).
    pub async fn chat_completion_json(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> anyhow::Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
            .build()?;
        self.send(request, "chat_completion_json").await
    }

    async fn send(&self, request: CreateChatCompletionRequest, kind: &str) -> anyhow::Result<String> {
        tracing::info!(
            kind = %kind,
            model = %request.model,
            message_count = request.messages.len(),
            api_key = %mask_token(&self.api_key_for_logging),
            "OpenAI request"
        );

        if let Ok(json) = serde_json::to_string_pretty(&request) {
            tracing::debug!(request_json = %json, "OpenAI request JSON");
        }

        let response = self.client.chat().create(request).await?;

        if let Some(ref u) = response.usage {
            tracing::info!(
                kind = %kind,
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "OpenAI usage"
            );
        }

        match response.choices.first() {
            Some(choice) => Ok(choice.message.content.clone().unwrap_or_default()),
            None => anyhow::bail!("No response from OpenAI"),
        }
    }
}
