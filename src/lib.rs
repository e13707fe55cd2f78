use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdNovaError>;

#[derive(Error, Debug)]
pub enum AdNovaError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Memory error: {0}")]
    Memory(#[from] memory::MemoryError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] embeddings::EmbeddingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod artifacts;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod memory;
pub mod variations;
