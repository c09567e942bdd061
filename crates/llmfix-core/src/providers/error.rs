//! Provider error types

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to a model backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The backend rejected or failed the request
    #[error("{provider} API error: {message}")]
    ApiError { provider: String, message: String },

    /// No answer within the configured timeout
    #[error("{provider} timed out after {after:?}")]
    Timeout { provider: String, after: Duration },

    /// Request was cancelled
    #[error("Request cancelled")]
    Cancelled,

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Create an API error
    pub fn api_error(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(provider: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            provider: provider.into(),
            after,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProviderError::Cancelled)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
