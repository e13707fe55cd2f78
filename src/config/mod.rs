// Configuration management module
// TOML configuration for the embedding provider and data locations

pub mod settings;

pub use settings::{
    Config, ConfigError, EmbeddingConfig, EmbeddingProviderKind, OllamaConfig, OpenAiConfig,
};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}
