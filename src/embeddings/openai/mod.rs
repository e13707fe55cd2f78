#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::http::{agent_with_timeout, request_with_retry};
use super::{EmbeddingError, EmbeddingProvider};
use crate::config::Config;

/// Client for the OpenAI `/v1/embeddings` endpoint
#[derive(Clone)]
pub struct OpenAiClient {
    endpoint: Url,
    model: String,
    api_key: String,
    agent: ureq::Agent,
    retry_attempts: u32,
}

// Keeps the API key out of debug output
impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("retry_attempts", &self.retry_attempts)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiClient {
    /// Create a client, reading the API key from the configured environment variable
    #[inline]
    pub fn new(config: &Config) -> Result<Self, EmbeddingError> {
        let key_var = &config.openai.api_key_env;
        let api_key = std::env::var(key_var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| EmbeddingError::MissingApiKey(key_var.clone()))?;

        Self::with_api_key(config, api_key)
    }

    #[inline]
    pub fn with_api_key(config: &Config, api_key: String) -> Result<Self, EmbeddingError> {
        let mut base_url = config
            .openai
            .api_url()
            .map_err(|e| EmbeddingError::InvalidEndpoint(e.to_string()))?;

        // Relative joins drop the last path segment unless it ends with a slash
        if !base_url.path().ends_with('/') {
            let with_slash = format!("{}/", base_url.path());
            base_url.set_path(&with_slash);
        }

        let endpoint = base_url
            .join("v1/embeddings")
            .map_err(|e| EmbeddingError::InvalidEndpoint(e.to_string()))?;

        Ok(Self {
            endpoint,
            model: config.openai.model.clone(),
            api_key,
            agent: agent_with_timeout(Duration::from_secs(config.embedding.timeout_seconds)),
            retry_attempts: config.embedding.retry_attempts,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = agent_with_timeout(timeout);
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    #[inline]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl EmbeddingProvider for OpenAiClient {
    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        debug!("Requesting OpenAI embedding (length: {})", text.len());

        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| EmbeddingError::Request(format!("Failed to serialize request: {}", e)))?;
        let authorization = format!("Bearer {}", self.api_key);

        let response_text = request_with_retry(self.retry_attempts, self.endpoint.as_str(), || {
            self.agent
                .post(self.endpoint.as_str())
                .header("Content-Type", "application/json")
                .header("Authorization", &authorization)
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })?;

        let response: EmbeddingResponse = serde_json::from_str(&response_text)
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding data returned".to_string()))
    }

    #[inline]
    fn name(&self) -> String {
        format!("openai ({})", self.model)
    }
}
