//! Configuration provider abstractions
//!
//! Supports multiple configuration sources:
//! - `MemoryConfigProvider`: In-memory for testing
//! - `FileConfigProvider`: YAML file-based (user/workspace level)

mod traits;
mod memory;
mod file;

pub use traits::{first_configured, ConfigError, ConfigProvider, ConfigResult, FixConfig};
pub use memory::MemoryConfigProvider;
pub use file::{ConfigLevel, FileConfigProvider};
