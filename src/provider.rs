//! Completion Provider Abstraction
//!
//! Interface to the external text-generation service. A provider issues exactly
//! one call per `complete`; continuation and retry live in
//! [`crate::completion::CompletionClient`].

use crate::error::{ApiError, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Per-call generation options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Maximum tokens to generate in one call
    pub max_tokens: u32,
    /// 0.0-2.0
    pub temperature: f32,
    /// -2.0 to 2.0
    pub presence_penalty: f32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.2,
            presence_penalty: 0.0,
        }
    }
}

/// Text completion service
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issue one completion call. The returned text may be truncated.
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ProviderError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Provider section of the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Model used for text completions
    #[serde(default = "default_model")]
    pub model: String,

    /// API key (normally supplied through OPENAI_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Organization identifier (OPENAI_ORGANIZATION)
    #[serde(default)]
    pub organization: Option<String>,

    /// Custom endpoint, e.g. a proxy or an OpenAI-compatible local server
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_model() -> String {
    "gpt-3.5-turbo-instruct".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            organization: None,
            endpoint: None,
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!("Endpoint must be an http(s) URL: {}", endpoint));
            }
        }
        Ok(())
    }

    /// Build the HTTP client described by this configuration.
    pub fn create_client(&self) -> Result<Arc<dyn CompletionProvider>, ApiError> {
        let api_key = self
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::NotConfigured(
                    "OPENAI_API_KEY is not set and provider.api_key is empty".to_string(),
                )
            })?;
        let client = OpenAIClient::new(
            self.model.clone(),
            api_key,
            self.organization.clone(),
            self.endpoint.clone(),
        )?;
        Ok(Arc::new(client))
    }
}

// Legacy text-completions request/response structures
#[derive(Serialize)]
struct TextCompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    presence_penalty: f32,
}

#[derive(Deserialize)]
struct TextCompletionResponse {
    choices: Vec<TextChoice>,
}

#[derive(Deserialize)]
struct TextChoice {
    #[serde(default)]
    text: String,
}

// Helper function to map transport errors to ProviderError
pub(crate) fn map_http_error(error: reqwest::Error) -> ProviderError {
    if let Some(status) = error.status() {
        map_status(status.as_u16(), &error.to_string())
    } else if error.is_timeout() {
        ProviderError::RequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ProviderError::RequestFailed(format!("Connection error: {}", error))
    } else {
        ProviderError::Other(format!("HTTP error: {}", error))
    }
}

pub(crate) fn map_status(status: u16, body: &str) -> ProviderError {
    match status {
        401 | 403 => ProviderError::AuthFailed(format!("Authentication failed: {}", body)),
        429 => ProviderError::RateLimit(format!("Rate limit exceeded: {}", body)),
        404 => ProviderError::ModelNotFound(format!("Not found: {}", body)),
        _ => ProviderError::RequestFailed(format!(
            "Request failed with status {}: {}",
            status, body
        )),
    }
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PROVIDER_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) fn build_provider_http_client() -> Result<Client, ProviderError> {
    Client::builder()
        .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT)
        .timeout(PROVIDER_HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ProviderError::Other(format!("Failed to create HTTP client: {}", e)))
}

/// OpenAI text-completions client
pub struct OpenAIClient {
    client: Client,
    model: String,
    api_key: String,
    organization: Option<String>,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(
        model: String,
        api_key: String,
        organization: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = build_provider_http_client()?;
        let base_url = base_url
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            model,
            api_key,
            organization,
            base_url,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAIClient {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ProviderError> {
        let request = TextCompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            presence_penalty: options.presence_penalty,
        };

        let url = format!("{}/completions", self.base_url);
        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request);
        if let Some(organization) = &self.organization {
            builder = builder.header("OpenAI-Organization", organization);
        }

        let response = builder.send().await.map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status(status, &error_text));
        }

        let completion: TextCompletionResponse = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse(format!("Failed to parse response: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| ProviderError::MalformedResponse("No choices in response".to_string()))
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
