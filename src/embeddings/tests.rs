use super::*;

struct ConstantProvider;

impl EmbeddingProvider for ConstantProvider {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(vec![1.0, 2.0])
    }

    fn name(&self) -> String {
        "constant".to_string()
    }
}

#[test]
fn truncate_short_text_is_unchanged() {
    assert_eq!(truncate_for_embedding("hello", 10), "hello");
    assert_eq!(truncate_for_embedding("hello", 5), "hello");
    assert_eq!(truncate_for_embedding("", 5), "");
}

#[test]
fn truncate_counts_characters_not_bytes() {
    let text = "héllo wörld";

    assert_eq!(truncate_for_embedding(text, 4), "héll");
    assert_eq!(truncate_for_embedding(text, 8), "héllo wö");
}

#[test]
fn boxed_provider_delegates() {
    let provider: Box<dyn EmbeddingProvider> = Box::new(ConstantProvider);

    assert_eq!(provider.name(), "constant");
    assert_eq!(
        provider.embed("anything").expect("should embed"),
        vec![1.0, 2.0]
    );
}

#[test]
fn provider_selection_follows_config() {
    let mut config = Config::default();
    config.embedding.provider = EmbeddingProviderKind::Ollama;

    let provider = provider_from_config(&config).expect("ollama provider needs no key");
    assert!(provider.name().starts_with("ollama"));
}

#[test]
fn openai_selection_requires_key() {
    let mut config = Config::default();
    config.openai.api_key_env = "ADNOVA_UNSET_KEY_FOR_SELECTION_TEST".to_string();

    assert!(matches!(
        provider_from_config(&config),
        Err(EmbeddingError::MissingApiKey(_))
    ));
}
