//! Image search over real HTTP against a local stub server

use super::test_utils::*;
use quill::assets::{AssetResolver, ImageSearch, UnsplashClient};
use quill::error::ProviderError;
use quill::types::ImageAsset;
use std::sync::Arc;

fn client(base_url: String) -> UnsplashClient {
    UnsplashClient::new("test-access-key".to_string(), Some(base_url), Some("es".to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_http_404_degrades_to_no_image() {
    let (base_url, server) = serve_once("404 Not Found", "{\"errors\":[\"Not found\"]}".into()).await;
    let resolver = AssetResolver::new(
        Arc::new(client(base_url)),
        category_map(&[("garden", "gardening")]),
    );

    let asset = resolver.resolve("garden").await;

    assert_eq!(asset, ImageAsset::new("", ""));
    let request = server.await.unwrap();
    assert!(request.starts_with("GET /search/photos?"));
    assert!(request.contains("query=gardening"));
}

#[tokio::test]
async fn test_first_result_is_used() {
    let body = r#"{
        "total": 2,
        "results": [
            {"urls": {"regular": "https://img/1", "small": "https://img/1-small"}, "user": {"name": "alice"}},
            {"urls": {"regular": "https://img/2"}, "user": {"name": "bob"}}
        ]
    }"#;
    let (base_url, server) = serve_once("200 OK", body.to_string()).await;

    let asset = client(base_url).search("gardening").await.unwrap();

    assert_eq!(asset, Some(ImageAsset::new("https://img/1", "alice")));
    let request = server.await.unwrap().to_lowercase();
    assert!(request.contains("per_page=1"));
    assert!(request.contains("lang=es"));
    assert!(request.contains("authorization: client-id test-access-key"));
}

#[tokio::test]
async fn test_empty_results_mean_no_image() {
    let (base_url, _server) = serve_once("200 OK", r#"{"total":0,"results":[]}"#.to_string()).await;
    assert_eq!(client(base_url).search("nothing").await.unwrap(), None);
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_error() {
    let (base_url, _server) = serve_once("401 Unauthorized", "{}".to_string()).await;
    let err = client(base_url).search("gardening").await.unwrap_err();
    assert!(matches!(err, ProviderError::AuthFailed(_)));
}
