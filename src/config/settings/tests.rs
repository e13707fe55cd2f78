use super::*;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.embedding.provider, EmbeddingProviderKind::OpenAi);
    assert_eq!(config.embedding.dimension, 1536);
    assert_eq!(config.embedding.max_input_chars, 8000);
    assert_eq!(config.openai.model, "text-embedding-ada-002");
    assert_eq!(config.ollama.host, "localhost");
    assert_eq!(config.ollama.port, 11434);
}

#[test]
fn config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    let mut invalid_config = config.clone();
    invalid_config.ollama.protocol = "ftp".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.port = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.openai.model = String::new();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.openai.base_url = "not a url".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.embedding.dimension = 8;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidEmbeddingDimension(8))
    ));

    let mut invalid_config = config.clone();
    invalid_config.embedding.timeout_seconds = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config;
    invalid_config.embedding.retry_attempts = 0;
    assert!(invalid_config.validate().is_err());
}

#[test]
fn ollama_url_generation() {
    let config = Config::default();
    let url = config
        .ollama
        .ollama_url()
        .expect("should generate ollama_url successfully");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(config, parsed_config);
}

#[test]
fn partial_toml_uses_defaults() {
    let toml_str = r#"
        [embedding]
        provider = "ollama"
        dimension = 768
    "#;

    let config: Config = toml::from_str(toml_str).expect("should parse partial toml");
    assert_eq!(config.embedding.provider, EmbeddingProviderKind::Ollama);
    assert_eq!(config.embedding.dimension, 768);
    assert_eq!(config.embedding.max_input_chars, 8000);
    assert_eq!(config.openai, OpenAiConfig::default());
}

#[test]
fn derived_paths() {
    let config = Config::with_base_dir("/tmp/adnova-home");

    assert_eq!(
        config.memory_index_path(),
        PathBuf::from("/tmp/adnova-home/data/memory_index.json")
    );
    assert_eq!(
        config.campaign_briefs_dir(),
        PathBuf::from("/tmp/adnova-home/data/campaign_briefs")
    );
    assert_eq!(
        config.generated_ads_dir(),
        PathBuf::from("/tmp/adnova-home/data/generated_ads")
    );
    assert_eq!(
        config.feedback_dir(),
        PathBuf::from("/tmp/adnova-home/data/feedback")
    );
    assert_eq!(
        config.recommendations_dir(),
        PathBuf::from("/tmp/adnova-home/data/recommendations")
    );
}

#[test]
fn load_missing_file_returns_defaults() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");

    let config = Config::load(temp_dir.path()).expect("should load defaults");

    assert_eq!(config.embedding, EmbeddingConfig::default());
    assert_eq!(config.get_base_dir(), temp_dir.path());
}

#[test]
fn save_and_load_round_trip() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");

    let mut config = Config::with_base_dir(temp_dir.path());
    config.embedding.provider = EmbeddingProviderKind::Ollama;
    config.embedding.dimension = 768;
    config.ollama.model = "mxbai-embed-large".to_string();
    config.save().expect("should save config");

    let loaded = Config::load(temp_dir.path()).expect("should load saved config");
    assert_eq!(config, loaded);
}

#[test]
fn load_rejects_invalid_values() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    std::fs::write(
        temp_dir.path().join("config.toml"),
        "[embedding]\ndimension = 3\n",
    )
    .expect("should write config file");

    assert!(Config::load(temp_dir.path()).is_err());
}
