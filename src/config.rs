//! Configuration System
//!
//! Layered configuration for the pipeline: built-in defaults, a global file, workspace
//! files, `QUILL_*` environment overrides and credential variables. See
//! [`ConfigLoader::load`] for the exact order.

use crate::artifacts::OutputConfig;
use crate::assets::ImageSearchConfig;
use crate::error::ApiError;
use crate::generator::GenerationSettings;
use crate::inputs::InputConfig;
use crate::logging::LoggingConfig;
use crate::provider::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::environment::{
    IMAGE_SEARCH_API_KEY_VAR, OPENAI_API_KEY_VAR, OPENAI_ORGANIZATION_VAR,
};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuillConfig {
    /// Completion service
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Image search service
    #[serde(default)]
    pub images: ImageSearchConfig,

    /// Concurrency, retry and per-field completion options
    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub inputs: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Record store directory, relative to the workspace unless absolute
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".quill/store")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.store_path.as_os_str().is_empty() {
            return Err("Store path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Provider(String),
    Images(String),
    Generation(String),
    Storage(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "provider: {}", msg),
            ValidationError::Images(msg) => write!(f, "images: {}", msg),
            ValidationError::Generation(msg) => write!(f, "generation: {}", msg),
            ValidationError::Storage(msg) => write!(f, "storage: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

const MASK: &str = "********";

impl QuillConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let checks = [
            self.provider.validate().map_err(ValidationError::Provider),
            self.images.validate().map_err(ValidationError::Images),
            self.generation.validate().map_err(ValidationError::Generation),
            self.storage.validate().map_err(ValidationError::Storage),
            self.logging.validate().map_err(ValidationError::Logging),
        ];
        let errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every problem into one `ApiError::ConfigError`.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })
    }

    /// Resolve a configured path against the workspace root.
    pub fn resolve(workspace_root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            workspace_root.join(path)
        }
    }

    /// The effective configuration as TOML with credentials masked.
    pub fn to_masked_toml(&self) -> Result<String, ApiError> {
        let mut masked = self.clone();
        for secret in [&mut masked.provider.api_key, &mut masked.images.api_key] {
            if secret.is_some() {
                *secret = Some(MASK.to_string());
            }
        }
        toml::to_string_pretty(&masked)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render configuration: {}", e)))
    }
}
