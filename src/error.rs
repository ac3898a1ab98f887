//! Error types for the Quill article generation pipeline.

use thiserror::Error;

/// Storage-related errors
///
/// Any of these is fatal for a batch: without the record store there is no
/// way to tell which items still need work.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to open record store at {path}: {message}")]
    Open { path: String, message: String },

    #[error("Record store operation failed: {0}")]
    Database(String),

    #[error("Corrupt record for keyword {keyword:?}: {message}")]
    Corrupt { keyword: String, message: String },

    #[error("Failed to encode record for keyword {keyword:?}: {message}")]
    Encode { keyword: String, message: String },

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        match err {
            sled::Error::Io(io) => StorageError::IoError(io),
            other => StorageError::Database(other.to_string()),
        }
    }
}

/// A single failed call to an external service.
///
/// Completion calls recover from these inside the retry loop; image lookups
/// degrade them to "no image".
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    AuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Provider model not found: {0}")]
    ModelNotFound(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Provider error: {0}")]
    Other(String),
}

/// Terminal failure of one sub-generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("completion retries exhausted after {attempts} attempts{}", last_error_suffix(.last_error))]
    RetriesExhausted {
        attempts: usize,
        last_error: Option<String>,
    },

    #[error("provider returned no text")]
    EmptyOutput,

    #[error("title prompt produced an empty title")]
    EmptyTitle,
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(message) => format!(" (last error: {})", message),
        None => String::new(),
    }
}

impl GenerationError {
    /// Stable machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            GenerationError::RetriesExhausted { .. } => "retries_exhausted",
            GenerationError::EmptyOutput => "empty_output",
            GenerationError::EmptyTitle => "empty_title",
        }
    }
}

/// Crate-level errors surfaced to the facade and CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input file {path}: {message}")]
    InputError { path: String, message: String },

    #[error("Failed to write artifact {path}: {message}")]
    ArtifactError { path: String, message: String },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Runtime error: {0}")]
    RuntimeError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
