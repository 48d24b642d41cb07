//! Error types for the Vertex adapter.

use thiserror::Error;

/// Main error type for the adapter.
#[derive(Error, Debug)]
pub enum VertexError {
    /// Invalid or missing configuration (USING arguments, args-blob keys).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The named model does not exist in the cloud account.
    #[error("Vertex model {0} not found")]
    ModelNotFound(String),

    /// The named endpoint does not exist.
    #[error("Vertex endpoint {0} not found")]
    EndpointNotFound(String),

    /// Predict was called before a successful create stored its record.
    #[error("no deployment record under `{0}`, run create first")]
    NotDeployed(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Non-success API response.
    #[error("API error {code}: {message}")]
    ApiError { code: u16, message: String },

    /// Malformed API response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Host storage failure.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<reqwest::Error> for VertexError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}
