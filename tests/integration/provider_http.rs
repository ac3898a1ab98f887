//! Completion client over real HTTP against a local stub server

use super::test_utils::*;
use quill::completion::{wrap_prompt, CompletionClient};
use quill::error::ProviderError;
use quill::provider::{CompletionOptions, CompletionProvider, OpenAIClient, ProviderConfig};
use std::sync::Arc;

fn client(base_url: String, organization: Option<&str>) -> OpenAIClient {
    OpenAIClient::new(
        "gpt-3.5-turbo-instruct".to_string(),
        "sk-test".to_string(),
        organization.map(str::to_string),
        Some(base_url),
    )
    .unwrap()
}

#[tokio::test]
async fn test_completion_request_shape_and_parsing() {
    let body = r#"{"id":"cmpl-1","choices":[{"text":"Hola mundo<end>","index":0}]}"#;
    let (base_url, server) = serve_once("200 OK", body.to_string()).await;
    let completions = CompletionClient::new(Arc::new(client(base_url, Some("org-123"))));

    let options = CompletionOptions {
        max_tokens: 45,
        temperature: 0.2,
        presence_penalty: 0.0,
    };
    let text = completions.generate("Saluda", &options).await.unwrap();
    assert_eq!(text, "Hola mundo");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /completions "));
    let lower = request.to_lowercase();
    assert!(lower.contains("authorization: bearer sk-test"));
    assert!(lower.contains("openai-organization: org-123"));

    let (_, json_body) = request.split_once("\r\n\r\n").unwrap();
    let json: serde_json::Value = serde_json::from_str(json_body).unwrap();
    assert_eq!(json["model"], "gpt-3.5-turbo-instruct");
    assert_eq!(json["max_tokens"], 45);
    assert_eq!(json["prompt"], wrap_prompt("Saluda"));
}

#[tokio::test]
async fn test_rate_limit_is_reported_as_such() {
    let (base_url, _server) = serve_once("429 Too Many Requests", "{}".to_string()).await;
    let err = client(base_url, None)
        .complete("x", &CompletionOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::RateLimit(_)));
}

#[tokio::test]
async fn test_response_without_choices_is_malformed() {
    let (base_url, _server) = serve_once("200 OK", r#"{"choices":[]}"#.to_string()).await;
    let err = client(base_url, None)
        .complete("x", &CompletionOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::MalformedResponse(_)));
}

#[test]
fn test_provider_config_requires_key() {
    let config = ProviderConfig::default();
    assert!(config.create_client().is_err());

    let config = ProviderConfig {
        api_key: Some("sk-test".to_string()),
        ..ProviderConfig::default()
    };
    let client = config.create_client().unwrap();
    assert_eq!(client.provider_name(), "openai");
    assert_eq!(client.model_name(), "gpt-3.5-turbo-instruct");
}
