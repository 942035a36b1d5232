//! Error types for adrelay

use thiserror::Error;

/// Result type for adrelay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for adrelay
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request body could not be read or interpreted
    #[error("Invalid request body: {0}")]
    Body(String),

    /// Transport-level failure talking to the backend
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend function ran and reported an error
    #[error("Mutation failed: {message}")]
    Mutation {
        message: String,
        data: Option<serde_json::Value>,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
