//! Chat-completions client for OpenRouter-compatible providers.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;

/// The narrow capability the invocation bridge depends on: one prompt
/// string in, one text payload out. Any provider with this shape is
/// substitutable, which is what lets the bridge be tested against a
/// scripted stub instead of a live model.
pub trait CompletionModel {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

/// HTTP client for an OpenRouter-style chat-completions endpoint.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenRouterClient {
    /// Create a client from AI config plus a resolved API key.
    pub fn new(config: &AiConfig, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }
}

impl CompletionModel for OpenRouterClient {
    /// Send a fully-assembled prompt as a single user message.
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to model provider")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Model provider error ({}): {}", status, error_text);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse model provider response")?;

        chat_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("No response content from model"))
    }
}
