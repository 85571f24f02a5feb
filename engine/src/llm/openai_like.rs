//! OpenAI-compatible chat provider
//!
//! Speaks the `/chat/completions` protocol used by OpenRouter, OpenAI, and
//! most self-hosted gateways. Model identifier, endpoint, credential,
//! output budget, and temperature all come from configuration — nothing is
//! hardcoded in the retrieval code.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use super::{LLMError, LLMProvider, Message, Result};
use crate::config::LLMConfig;

pub struct OpenAiLikeProvider {
    config: LLMConfig,
    api_key: String,
    client: Client,
}

impl OpenAiLikeProvider {
    /// Create a new provider with a resolved credential.
    ///
    /// The per-call timeout from config is installed on the HTTP client, so
    /// every completion is bounded without wrapping call sites.
    pub fn try_new(config: LLMConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        Ok(Self {
            config,
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAiLikeProvider {
    fn name(&self) -> &str {
        "openai_like"
    }

    async fn check_health(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let api_messages: Vec<_> = messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.to_string(),
                    "content": msg.content,
                })
            })
            .collect();

        let payload = json!({
            "model": self.config.model,
            "messages": api_messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        tracing::debug!(
            model = %self.config.model,
            messages = messages.len(),
            "Chat completion request"
        );

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else if e.is_connect() {
                    LLMError::ProviderUnavailable(format!(
                        "Cannot connect to {}",
                        self.config.base_url
                    ))
                } else {
                    LLMError::NetworkError(e.to_string())
                }
            })?;

        tracing::debug!(
            "Chat completion response received in {:.1}s",
            start.elapsed().as_secs_f64()
        );

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                401 | 403 => LLMError::AuthenticationFailed(text),
                429 => LLMError::RateLimitExceeded,
                _ => LLMError::InvalidRequest(text),
            });
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let content = data
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| LLMError::ParseError("No content in response".to_string()))?;

        if content.trim().is_empty() {
            return Err(LLMError::ParseError("Empty content".to_string()));
        }

        Ok(content.to_string())
    }
}
