//! Model builder abstraction
//!
//! One fluent setter per `ModelOption`, implemented by every provider
//! variant. A variant that cannot honor an option keeps going as if the call
//! never happened.
//!
//! ```rust,ignore
//! use llmfix_core::builder::{ChatModelBuilder, ProviderVariant};
//!
//! let model = ProviderVariant::Anthropic
//!     .builder()
//!     .model_name("claude-3-haiku-20240307")
//!     .temperature(0.1)
//!     .seed(42) // not honored by Anthropic, silently dropped
//!     .build()?;
//! ```

#[macro_use]
mod macros;
mod error;
mod options;
mod provider;
mod traits;
mod variants;
mod dispatch;

pub use error::{BuildResult, ConfigurationError};
pub use options::{ModelConfiguration, ModelOption};
pub use provider::ProviderVariant;
pub use traits::{ChatModelBuilder, ResolvedModel};
pub use variants::{
    AnthropicBuilder, GoogleBuilder, LocalAiBuilder, MistralBuilder, OllamaBuilder, OpenAiBuilder,
};
pub use dispatch::ProviderBuilder;
