//! Embedding model client
//!
//! Embeds question text for the semantic retrieval path, speaking the
//! OpenAI-compatible `/embeddings` protocol. The configured dimensionality
//! is enforced on every returned vector: chunks were indexed against the
//! same value, so a mismatch here is a configuration fault rather than a
//! runtime-recoverable condition.

use async_trait::async_trait;
use reqwest::Client;
use sdk::errors::EngineError;
use serde_json::json;
use std::time::Duration;

use crate::config::EmbeddingConfig;

/// Embedding model trait
///
/// The query path and the ingestion path share one implementation, so both
/// sides of the store always agree on model and dimensionality.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embedding dimensionality this provider is configured for
    fn dimension(&self) -> usize;

    /// Embed one text into a vector of exactly `dimension()` components
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError>;

    /// Check if the provider is currently healthy and available.
    /// Default implementation returns true.
    async fn check_health(&self) -> bool {
        true
    }
}

/// OpenAI-compatible embeddings client
pub struct HttpEmbeddingProvider {
    config: EmbeddingConfig,
    api_key: String,
    client: Client,
}

impl HttpEmbeddingProvider {
    /// Create a new client with a resolved credential.
    ///
    /// The credential may be empty for unauthenticated local endpoints.
    pub fn try_new(
        config: EmbeddingConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                EngineError::Config(format!("Failed to build embedding HTTP client: {}", e))
            })?;

        Ok(Self {
            config,
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn check_health(&self) -> bool {
        // Local endpoints may be unauthenticated; a configured env var that
        // resolved to nothing is caught at boot.
        !self.config.base_url.is_empty()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::ModelCall(
                "Cannot embed empty text".to_string(),
            ));
        }

        let url = format!("{}/embeddings", self.config.base_url);

        let payload = json!({
            "model": self.config.model,
            "input": [text],
        });

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&payload);

        if !self.api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::ModelTimeout
            } else {
                EngineError::ModelCall(format!("Embedding request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(EngineError::ModelCall(format!(
                "Embedding API error ({}): {}",
                status, text
            )));
        }

        let data: serde_json::Value = response.json().await.map_err(|e| {
            EngineError::ModelCall(format!("Failed to parse embedding response: {}", e))
        })?;

        let vector: Vec<f32> = data
            .get("data")
            .and_then(|d| d.as_array())
            .and_then(|d| d.first())
            .and_then(|entry| entry.get("embedding"))
            .and_then(|embedding| embedding.as_array())
            .ok_or_else(|| {
                EngineError::ModelCall("No embedding in response".to_string())
            })?
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| {
                EngineError::ModelCall("Non-numeric embedding component".to_string())
            })?;

        if vector.len() != self.config.dimension {
            return Err(EngineError::Config(format!(
                "Embedding dimensionality mismatch: model returned {} components, \
                 configuration expects {}",
                vector.len(),
                self.config.dimension
            )));
        }

        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String, dimension: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            base_url,
            dimension,
            ..EmbeddingConfig::default()
        }
    }

    #[tokio::test]
    async fn test_embed_returns_vector() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [0.1, 0.2, 0.3]}]
            })))
            .mount(&server)
            .await;

        let provider =
            HttpEmbeddingProvider::try_new(test_config(server.uri(), 3), "").unwrap();
        let vector = provider.embed("Q3 strategy").await.unwrap();

        assert_eq!(vector.len(), 3);
        assert!((vector[1] - 0.2).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_config_fault() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [0.1, 0.2, 0.3]}]
            })))
            .mount(&server)
            .await;

        // Configured for 384 but the endpoint returns 3 components
        let provider =
            HttpEmbeddingProvider::try_new(test_config(server.uri(), 384), "").unwrap();
        let err = provider.embed("Q3 strategy").await.unwrap_err();

        assert!(matches!(err, EngineError::Config(_)));
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let provider = HttpEmbeddingProvider::try_new(
            test_config("http://localhost:9".to_string(), 3),
            "",
        )
        .unwrap();
        let err = provider.embed("   ").await.unwrap_err();

        assert!(matches!(err, EngineError::ModelCall(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_model_call_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider =
            HttpEmbeddingProvider::try_new(test_config(server.uri(), 3), "").unwrap();
        let err = provider.embed("text").await.unwrap_err();

        assert!(matches!(err, EngineError::ModelCall(_)));
    }
}
