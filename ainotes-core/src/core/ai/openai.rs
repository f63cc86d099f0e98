use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::provider::{ChatProvider, ChatRequest};
use super::AiConfig;

/// [`ChatProvider`] for any endpoint that speaks the OpenAI
/// `/chat/completions` protocol (Groq, OpenAI, local servers).
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    http: Client,
    config: AiConfig,
}

impl OpenAiCompatibleClient {
    /// Builds a client whose requests give up after `config.timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AiNotesError::Http`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: AiConfig) -> crate::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("no API key configured for {}", self.config.base_url))?;

        let endpoint = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let payload = OpenAiChatRequest {
            model: self.config.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|message| OpenAiMessage {
                    role: message.role.as_str().to_owned(),
                    content: message.content.clone(),
                })
                .collect(),
            stream: false,
            temperature: request.temperature.unwrap_or(self.config.temperature),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
        };

        let response = self
            .http
            .post(endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .context("failed to request provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("provider request failed: {} {}", status, text));
        }

        let output: OpenAiChatResponse = response
            .json()
            .await
            .context("invalid provider response json")?;

        let content = output
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.is_empty() {
            warn!(model = %self.config.model, "empty completion content");
        }

        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    stream: bool,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiAssistantMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiAssistantMessage {
    content: Option<String>,
}
