//! Configuration provider trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::builder::{ModelConfiguration, ProviderVariant};

/// Which backend the fixes use and how it is configured
///
/// ```yaml
/// provider: anthropic
/// model:
///   model_name: claude-3-haiku-20240307
///   temperature: 0.1
///   timeout: 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixConfig {
    pub provider: ProviderVariant,
    #[serde(default)]
    pub model: ModelConfiguration,
}

impl FixConfig {
    pub fn new(provider: ProviderVariant) -> Self {
        Self {
            provider,
            model: ModelConfiguration::default(),
        }
    }

    pub fn with_model(mut self, model: ModelConfiguration) -> Self {
        self.model = model;
        self
    }
}

/// Configuration provider abstraction
///
/// Implementations:
/// - `MemoryConfigProvider`: In-memory for testing
/// - `FileConfigProvider`: YAML file (~/.config/llmfix/config.yaml)
/// - Editor adapters: read from the host's settings store
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// The stored configuration, `None` when nothing is configured
    async fn load(&self) -> ConfigResult<Option<FixConfig>>;

    /// Replace the stored configuration
    async fn save(&self, config: FixConfig) -> ConfigResult<()>;
}

/// First configuration found, in priority order (e.g. workspace before user)
pub async fn first_configured(providers: &[&dyn ConfigProvider]) -> ConfigResult<Option<FixConfig>> {
    for provider in providers {
        if let Some(config) = provider.load().await? {
            return Ok(Some(config));
        }
    }
    Ok(None)
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
