
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::http::{agent_with_timeout, request_with_retry};
use super::{EmbeddingError, EmbeddingProvider};
use crate::config::Config;

/// Client for a local Ollama server's `/api/embed` endpoint
#[derive(Debug, Clone)]
pub struct OllamaClient {
    endpoint: Url,
    model: String,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaClient {
    #[inline]
    pub fn new(config: &Config) -> Result<Self, EmbeddingError> {
        let base_url = config
            .ollama
            .ollama_url()
            .map_err(|e| EmbeddingError::InvalidEndpoint(e.to_string()))?;
        let endpoint = base_url
            .join("/api/embed")
            .map_err(|e| EmbeddingError::InvalidEndpoint(e.to_string()))?;

        Ok(Self {
            endpoint,
            model: config.ollama.model.clone(),
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

impl EmbeddingProvider for OllamaClient {
    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        debug!("Generating embedding for text (length: {})", text.len());

        let request = EmbedRequest {
            model: &self.model,
            input: text,
        };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| EmbeddingError::Request(format!("Failed to serialize request: {}", e)))?;

        let response_text = request_with_retry(self.retry_attempts, self.endpoint.as_str(), || {
            self.agent
                .post(self.endpoint.as_str())
                .header("Content-Type", "application/json")
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })?;

        let response: EmbedResponse = serde_json::from_str(&response_text)
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        let embedding = response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embeddings returned".to_string()))?;

        debug!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }

    #[inline]
    fn name(&self) -> String {
        format!("ollama ({})", self.model)
    }
}
