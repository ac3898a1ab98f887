//! Image asset resolution
//!
//! Maps an article category to a search term and asks an image-search service
//! for one representative picture. Lookups never fail the article: any problem
//! degrades to [`ImageAsset::none`].

use crate::error::ProviderError;
use crate::provider::{build_provider_http_client, map_http_error, map_status};
use crate::types::ImageAsset;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Image search service: zero or one hit per query.
#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Option<ImageAsset>, ProviderError>;
}

/// Image search section of the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSearchConfig {
    /// Resolve an image for every article
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Access key (normally supplied through IMAGE_SEARCH_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Service base URL
    #[serde(default = "default_image_endpoint")]
    pub endpoint: String,

    /// Optional language hint passed to the service
    #[serde(default = "default_locale")]
    pub locale: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_locale() -> Option<String> {
    Some("es".to_string())
}

fn default_image_endpoint() -> String {
    "https://api.unsplash.com".to_string()
}

impl Default for ImageSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            endpoint: default_image_endpoint(),
            locale: default_locale(),
        }
    }
}

impl ImageSearchConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(format!("Endpoint must be an http(s) URL: {}", self.endpoint));
        }
        if self.enabled && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(
                "Image search is enabled but IMAGE_SEARCH_API_KEY is not set".to_string(),
            );
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct PhotoSearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Deserialize)]
struct Photo {
    urls: Option<PhotoUrls>,
    user: Option<PhotoUser>,
}

#[derive(Deserialize)]
struct PhotoUrls {
    regular: Option<String>,
}

#[derive(Deserialize)]
struct PhotoUser {
    name: Option<String>,
}

/// Photo search client for Unsplash-compatible APIs
pub struct UnsplashClient {
    client: Client,
    api_key: String,
    base_url: String,
    locale: Option<String>,
}

impl UnsplashClient {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        locale: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = build_provider_http_client()?;
        let base_url = base_url
            .unwrap_or_else(default_image_endpoint)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            client,
            api_key,
            base_url,
            locale,
        })
    }

    pub fn from_config(config: &ImageSearchConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::NotConfigured("IMAGE_SEARCH_API_KEY is not set".to_string())
            })?;
        Self::new(api_key, Some(config.endpoint.clone()), config.locale.clone())
    }
}

#[async_trait]
impl ImageSearch for UnsplashClient {
    async fn search(&self, query: &str) -> Result<Option<ImageAsset>, ProviderError> {
        let url = format!("{}/search/photos", self.base_url);
        let mut params = vec![("query", query.to_string()), ("per_page", "1".to_string())];
        if let Some(locale) = &self.locale {
            params.push(("lang", locale.clone()));
        }

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Client-ID {}", self.api_key))
            .header("Accept-Version", "v1")
            .query(&params)
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(map_status(status, &error_text));
        }

        let body: PhotoSearchResponse = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse(format!("Failed to parse photo search: {}", e))
        })?;

        let Some(photo) = body.results.into_iter().next() else {
            return Ok(None);
        };
        let url = photo.urls.and_then(|u| u.regular).unwrap_or_default();
        let attribution = photo.user.and_then(|u| u.name).unwrap_or_default();
        if url.is_empty() || attribution.is_empty() {
            return Err(ProviderError::MalformedResponse(
                "Photo result is missing url or author".to_string(),
            ));
        }
        Ok(Some(ImageAsset::new(url, attribution)))
    }
}

/// Stand-in used when image resolution is disabled.
pub struct NoImageSearch;

#[async_trait]
impl ImageSearch for NoImageSearch {
    async fn search(&self, _query: &str) -> Result<Option<ImageAsset>, ProviderError> {
        Ok(None)
    }
}

/// Resolves categories to images through a category -> search term map.
#[derive(Clone)]
pub struct AssetResolver {
    search: Arc<dyn ImageSearch>,
    category_terms: Arc<HashMap<String, String>>,
}

impl AssetResolver {
    pub fn new(search: Arc<dyn ImageSearch>, category_terms: HashMap<String, String>) -> Self {
        Self {
            search,
            category_terms: Arc::new(category_terms),
        }
    }

    /// Search term for a category; unmapped categories are searched verbatim.
    pub fn query_for<'a>(&'a self, category: &'a str) -> &'a str {
        self.category_terms
            .get(category)
            .map(String::as_str)
            .unwrap_or(category)
    }

    /// Resolve one image for `category`. Never fails.
    pub async fn resolve(&self, category: &str) -> ImageAsset {
        let query = self.query_for(category);
        match self.search.search(query).await {
            Ok(Some(asset)) => {
                debug!(category, query, url = %asset.url, "Resolved image");
                asset
            }
            Ok(None) => {
                debug!(category, query, "Image search returned no results");
                ImageAsset::none()
            }
            Err(err) => {
                warn!(category, query, error = %err, "Image search failed, continuing without image");
                ImageAsset::none()
            }
        }
    }
}
