//! Core types shared by the model builders, providers and the repair engine.

mod message;
mod cancellation;

pub use message::{ChatMessage, MessageRole};
pub use cancellation::CancellationToken;
