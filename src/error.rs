//! Error types for the Powerdrill tool
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while talking to Powerdrill
#[derive(Debug, Error)]
pub enum PowerdrillError {
    /// A mandatory invocation parameter is absent or empty
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// A parameter is present but has an unusable value
    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    /// Upstream answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Request could not be sent or its body could not be read
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success response lacked a field we depend on
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PowerdrillError {
    /// True for errors detected before any network call was made
    pub fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            PowerdrillError::MissingParameter(_) | PowerdrillError::InvalidParameter { .. }
        )
    }
}

/// Result type alias for Powerdrill operations
pub type Result<T> = std::result::Result<T, PowerdrillError>;
