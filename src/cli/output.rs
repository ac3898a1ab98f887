//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, ProviderError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::ProviderError(ProviderError::NotConfigured(msg)) => format!(
            "{}\nSet the credential in the environment or in a .env file.",
            msg
        ),
        ApiError::ConfigError(msg) => format!("Configuration error: {}", msg),
        other => other.to_string(),
    }
}
