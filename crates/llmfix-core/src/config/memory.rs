//! In-memory configuration provider

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{ConfigProvider, ConfigResult, FixConfig};

/// In-memory configuration provider for testing
#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    config: RwLock<Option<FixConfig>>,
}

impl MemoryConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FixConfig) -> Self {
        Self {
            config: RwLock::new(Some(config)),
        }
    }

    pub fn clear(&self) {
        *self.config.write() = None;
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn load(&self) -> ConfigResult<Option<FixConfig>> {
        Ok(self.config.read().clone())
    }

    async fn save(&self, config: FixConfig) -> ConfigResult<()> {
        *self.config.write() = Some(config);
        Ok(())
    }
}
