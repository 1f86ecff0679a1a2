use super::*;
use crate::config::EmbeddingMode;

fn test_config() -> SearchConfig {
    SearchConfig::default()
}

#[test]
fn embedder_from_default_config() {
    let embedder = OllamaEmbedder::new(&test_config()).expect("embedder should build");
    assert_eq!(embedder.model, "nomic-embed-text:latest");
    assert_eq!(embedder.target_dimension, 768);
    assert_eq!(embedder.base_url.as_str(), "http://localhost:11434/");
}

#[test]
fn fast_mode_reduces_target_dimension() {
    let mut config = test_config();
    config.search.embedding_mode = EmbeddingMode::Fast;

    let embedder = OllamaEmbedder::new(&config).expect("embedder should build");
    assert_eq!(embedder.target_dimension, 256);
}

#[test]
fn embed_request_serialization() {
    let request = EmbedRequest {
        model: "nomic-embed-text:latest".to_string(),
        prompt: "How do I use Tab completion?".to_string(),
    };

    let json = serde_json::to_value(&request).expect("serialize");
    assert_eq!(json["model"], "nomic-embed-text:latest");
    assert_eq!(json["prompt"], "How do I use Tab completion?");
}

#[test]
fn embed_response_deserialization() {
    let response: EmbedResponse =
        serde_json::from_str(r#"{"embedding": [0.1, 0.2, 0.3]}"#).expect("deserialize");
    assert_eq!(response.embedding, vec![0.1, 0.2, 0.3]);
}

#[tokio::test]
async fn unreachable_server_yields_embedder_error() {
    let mut config = test_config();
    // Reserved TEST-NET address, nothing listens here
    config.ollama.host = "192.0.2.1".to_string();

    let embedder = OllamaEmbedder::new(&config)
        .expect("embedder should build")
        .with_timeout(Duration::from_millis(100))
        .with_retry_attempts(1);

    let result = embedder.embed("hello").await;
    assert!(matches!(result, Err(QaError::Embedder(_))));
}
