//! Error types for management API operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration validation error: {0}")]
    Validation(#[from] mnet_core::ValidationError),

    /// Remote failure, relayed unmodified
    #[error("Management API error (HTTP {status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Json(#[from] serde_json::Error),
}
