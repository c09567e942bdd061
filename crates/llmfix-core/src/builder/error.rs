//! Builder error types

use thiserror::Error;

use super::options::ModelOption;
use super::provider::ProviderVariant;

/// Raised by `build()` when a variant-mandatory field is missing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A field the variant cannot work without was never set
    #[error("{provider} requires `{option}` to be set")]
    MissingField {
        provider: ProviderVariant,
        option: ModelOption,
    },

    /// Provider identifier did not name a known variant
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

impl ConfigurationError {
    pub fn missing(provider: ProviderVariant, option: ModelOption) -> Self {
        Self::MissingField { provider, option }
    }
}

pub type BuildResult<T> = Result<T, ConfigurationError>;
