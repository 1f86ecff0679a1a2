#[cfg(test)]
mod tests;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{Embedder, reduce_dimension};
use crate::config::SearchConfig;
use crate::{QaError, Result};

const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

/// Ollama embedding client. Owns its own timeout and retry policy; the
/// Retriever above it never retries.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    base_url: Url,
    model: String,
    target_dimension: usize,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    #[inline]
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let base_url = config
            .ollama
            .base_url()
            .map_err(|e| QaError::Config(e.to_string()))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.ollama.timeout_seconds)))
            .build()
            .into();

        Ok(Self {
            base_url,
            model: config.ollama.embedding_model.clone(),
            target_dimension: config.search.embedding_mode.dimension() as usize,
            agent,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let url = self
            .base_url
            .join("/api/embed")
            .map_err(|e| QaError::Embedder(format!("Failed to build embedding URL: {}", e)))?;

        let request_json = serde_json::to_string(&request)
            .map_err(|e| QaError::Embedder(format!("Failed to serialize request: {}", e)))?;

        let response_text = self.make_request_with_retry(|| {
            self.agent
                .post(url.as_str())
                .header("Content-Type", "application/json")
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })?;

        let embed_response: EmbedResponse = serde_json::from_str(&response_text)
            .map_err(|e| QaError::Embedder(format!("Failed to parse response: {}", e)))?;

        Ok(embed_response.embedding)
    }

    fn make_request_with_retry<F>(&self, mut request_fn: F) -> Result<String>
    where
        F: FnMut() -> std::result::Result<String, ureq::Error>,
    {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            debug!("Embedding request attempt {}/{}", attempt, self.retry_attempts);

            match request_fn() {
                Ok(response_text) => return Ok(response_text),
                Err(error) => {
                    // Only server errors and transport failures are worth retrying
                    match &error {
                        ureq::Error::StatusCode(status) if *status >= 500 => {
                            warn!(
                                "Embedding server error (status {}), attempt {}/{}",
                                status, attempt, self.retry_attempts
                            );
                        }
                        ureq::Error::StatusCode(status) => {
                            return Err(QaError::Embedder(format!(
                                "Client error: HTTP {}",
                                status
                            )));
                        }
                        ureq::Error::ConnectionFailed
                        | ureq::Error::HostNotFound
                        | ureq::Error::Timeout(_)
                        | ureq::Error::Io(_) => {
                            warn!(
                                "Embedding transport error: {}, attempt {}/{}",
                                error, attempt, self.retry_attempts
                            );
                        }
                        _ => {
                            return Err(QaError::Embedder(format!(
                                "Non-retryable error: {}",
                                error
                            )));
                        }
                    }

                    last_error = Some(QaError::Embedder(format!("Request error: {}", error)));

                    if attempt < self.retry_attempts {
                        let delay_ms = EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1) * 1000;
                        std::thread::sleep(Duration::from_millis(delay_ms));
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| QaError::Embedder("Request failed after retries".to_string())))
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[inline]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating embedding for text (length: {})", text.len());

        let embedding = self.request_embedding(text)?;
        let reduced = reduce_dimension(embedding, self.target_dimension);

        debug!("Generated embedding with {} dimensions", reduced.len());
        Ok(reduced)
    }
}
