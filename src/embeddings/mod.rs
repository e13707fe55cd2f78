// Embeddings module
// Provider abstraction plus the OpenAI and Ollama HTTP clients

mod http;
pub mod ollama;
pub mod openai;

#[cfg(test)]
mod tests;

use thiserror::Error;

use crate::config::{Config, EmbeddingProviderKind};

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

/// Texts longer than this many characters are cut before embedding
pub const DEFAULT_MAX_INPUT_CHARS: usize = 8000;

/// Output size of `text-embedding-ada-002`
pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 1536;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding request timed out")]
    Timeout,
    #[error("Embedding request failed: {0}")]
    Request(String),
    #[error("Embedding provider returned HTTP {0}")]
    Status(u16),
    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),
    #[error("Embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Invalid provider endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("API key not found in environment variable {0}")]
    MissingApiKey(String),
}

/// Anything that can turn text into a fixed-length vector
pub trait EmbeddingProvider {
    /// Embed a single piece of text
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Human readable description used in logs and status output
    fn name(&self) -> String;
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<T> {
    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }

    #[inline]
    fn name(&self) -> String {
        (**self).name()
    }
}

/// Build the provider selected in the configuration
#[inline]
pub fn provider_from_config(config: &Config) -> Result<Box<dyn EmbeddingProvider>, EmbeddingError> {
    Ok(match config.embedding.provider {
        EmbeddingProviderKind::OpenAi => Box::new(OpenAiClient::new(config)?),
        EmbeddingProviderKind::Ollama => Box::new(OllamaClient::new(config)?),
    })
}

/// Cut `text` to at most `max_chars` characters
#[inline]
pub fn truncate_for_embedding(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text.get(..byte_idx).unwrap_or(text),
        None => text,
    }
}
