use super::*;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenAiClient {
    let mut config = Config::default();
    config.openai.base_url = server.uri();
    config.openai.model = "test-embedding".to_string();

    OpenAiClient::with_api_key(&config, "sk-test".to_string()).expect("Failed to create client")
}

#[test]
fn endpoint_keeps_base_path() {
    let mut config = Config::default();
    config.openai.base_url = "https://proxy.example.com/openai".to_string();

    let client =
        OpenAiClient::with_api_key(&config, "sk-test".to_string()).expect("should build client");

    assert_eq!(
        client.endpoint().as_str(),
        "https://proxy.example.com/openai/v1/embeddings"
    );
}

#[test]
fn default_endpoint() {
    let client = OpenAiClient::with_api_key(&Config::default(), "sk-test".to_string())
        .expect("should build client");

    assert_eq!(
        client.endpoint().as_str(),
        "https://api.openai.com/v1/embeddings"
    );
    assert_eq!(client.name(), "openai (text-embedding-ada-002)");
}

#[test]
fn missing_api_key() {
    let mut config = Config::default();
    config.openai.api_key_env = "ADNOVA_TEST_KEY_THAT_IS_NEVER_SET".to_string();

    let result = OpenAiClient::new(&config);

    assert!(matches!(result, Err(EmbeddingError::MissingApiKey(var)) if var == "ADNOVA_TEST_KEY_THAT_IS_NEVER_SET"));
}

#[test]
fn debug_output_hides_key() {
    let client = OpenAiClient::with_api_key(&Config::default(), "sk-secret".to_string())
        .expect("should build client");

    assert!(!format!("{:?}", client).contains("sk-secret"));
}

#[tokio::test(flavor = "multi_thread")]
async fn embed_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_json(serde_json::json!({
            "model": "test-embedding",
            "input": "Office chair ergonomic"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "list",
            "data": [{ "object": "embedding", "index": 0, "embedding": [0.5, 0.25] }],
            "model": "test-embedding"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = tokio::task::spawn_blocking(move || client.embed("Office chair ergonomic"))
        .await
        .expect("blocking task should finish");

    assert_eq!(result.expect("embedding should succeed"), vec![0.5, 0.25]);
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server).with_retry_attempts(2);
    let result = tokio::task::spawn_blocking(move || client.embed("anything"))
        .await
        .expect("blocking task should finish");

    assert!(matches!(result, Err(EmbeddingError::Status(503))));
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(serde_json::json!({ "data": [] })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server)
        .with_timeout(Duration::from_millis(200))
        .with_retry_attempts(1);
    let result = tokio::task::spawn_blocking(move || client.embed("anything"))
        .await
        .expect("blocking task should finish");

    assert!(matches!(result, Err(EmbeddingError::Timeout)));
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server).with_retry_attempts(1);
    let result = tokio::task::spawn_blocking(move || client.embed("anything"))
        .await
        .expect("blocking task should finish");

    assert!(matches!(result, Err(EmbeddingError::InvalidResponse(_))));
}
