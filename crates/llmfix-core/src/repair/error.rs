//! Repair error types

use thiserror::Error;

use crate::builder::ConfigurationError;
use crate::document::TransactionError;
use crate::providers::ProviderError;

/// The model answered, but not with a usable fix
#[derive(Debug, Error)]
pub enum RepairParseError {
    #[error("model response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model response has no `{0}` key")]
    MissingKey(&'static str),

    #[error("model returned an empty replacement")]
    EmptyReplacement,

    #[error("model suggested an invalid import: {0:?}")]
    InvalidImport(String),
}

#[derive(Debug, Error)]
pub enum RepairError {
    #[error(transparent)]
    Parse(#[from] RepairParseError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Model(#[from] ProviderError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("fix task failed: {0}")]
    Worker(String),
}

impl RepairError {
    /// Failures worth reporting to the user; the rest go to the log only
    pub fn is_user_visible(&self) -> bool {
        matches!(self, RepairError::Parse(_) | RepairError::Transaction(_))
    }
}

pub type RepairResult<T> = Result<T, RepairError>;
