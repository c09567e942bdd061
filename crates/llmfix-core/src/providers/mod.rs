//! Chat model implementations
//!
//! `GenaiChatModel` / `GenaiStreamingChatModel` are what the builders
//! produce; the `genai` crate handles the wire protocols (OpenAI, Anthropic,
//! Gemini and the OpenAI-compatible self-hosted servers). `MockChatModel`
//! is kept for tests and offline demos.

mod traits;
mod error;
mod genai_adapter;
mod genai_model;
mod mock;

pub use traits::{collect_text, ChatModel, Collected, StreamResponse, StreamingChatModel};
pub use error::{ProviderError, ProviderResult};
pub use genai_adapter::{adapter_kind, create_client};
pub use genai_model::{GenaiChatModel, GenaiStreamingChatModel};
pub use mock::{MockChatModel, MockMode};
