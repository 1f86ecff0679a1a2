
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::Generator;
use crate::config::SearchConfig;
use crate::{QaError, Result};

/// Ollama text-generation client over `/api/generate`.
///
/// Unlike the embedder this client does not retry: generation calls are
/// expensive and the caller has a hard latency budget, so one failed or
/// timed-out attempt goes straight to the fallback path.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    base_url: Url,
    model: String,
    timeout: Duration,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    system: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaGenerator {
    #[inline]
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let base_url = config
            .ollama
            .base_url()
            .map_err(|e| QaError::Config(e.to_string()))?;

        let timeout = Duration::from_secs(config.ollama.timeout_seconds);
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Ok(Self {
            base_url,
            model: config.ollama.generation_model.clone(),
            timeout,
            agent,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    #[inline]
    async fn generate(
        &self,
        system_prompt: &str,
        user_message: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        debug!(
            "Generating answer (prompt length: {}, max tokens: {})",
            user_message.len(),
            max_tokens
        );

        let request = GenerateRequest {
            model: self.model.clone(),
            system: system_prompt.to_string(),
            prompt: user_message.to_string(),
            stream: false,
            options: GenerateOptions {
                num_predict: max_tokens,
                temperature,
            },
        };

        let url = self
            .base_url
            .join("/api/generate")
            .map_err(|e| QaError::Generator(format!("Failed to build generate URL: {}", e)))?;

        let request_json = serde_json::to_string(&request)
            .map_err(|e| QaError::Generator(format!("Failed to serialize request: {}", e)))?;

        let response_text = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|error| match error {
                ureq::Error::Timeout(_) => {
                    warn!("Generation timed out after {:?}", self.timeout);
                    QaError::GeneratorTimeout(self.timeout)
                }
                ureq::Error::StatusCode(status) => {
                    QaError::Generator(format!("HTTP {}", status))
                }
                other => QaError::Generator(other.to_string()),
            })?;

        let generate_response: GenerateResponse = serde_json::from_str(&response_text)
            .map_err(|e| QaError::Generator(format!("Failed to parse response: {}", e)))?;

        debug!(
            "Generated {} characters of answer text",
            generate_response.response.len()
        );
        Ok(generate_response.response)
    }
}
