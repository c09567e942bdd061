//! Chat model traits

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;

use crate::types::{CancellationToken, ChatMessage};
use super::error::{ProviderError, ProviderResult};

/// Incremental text tokens from a streaming model
pub type StreamResponse = Pin<Box<dyn Stream<Item = ProviderResult<String>> + Send>>;

/// Submit messages, receive the complete answer
///
/// `Ok(None)` means the model answered with no content.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier as sent to the backend
    fn model_name(&self) -> &str;

    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        cancel_token: CancellationToken,
    ) -> ProviderResult<Option<String>>;
}

/// Submit messages, receive tokens as they are produced
#[async_trait]
pub trait StreamingChatModel: Send + Sync {
    /// Model identifier as sent to the backend
    fn model_name(&self) -> &str;

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse>;
}

/// Drain a token stream into one answer
///
/// Whitespace-only output counts as no content.
pub async fn collect_text(mut stream: StreamResponse) -> ProviderResult<Option<String>> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        text.push_str(&chunk?);
    }
    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

/// Adapts any streaming model into a `ChatModel` by collecting its tokens
pub struct Collected<M>(pub M);

#[async_trait]
impl<M: StreamingChatModel> ChatModel for Collected<M> {
    fn model_name(&self) -> &str {
        self.0.model_name()
    }

    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        cancel_token: CancellationToken,
    ) -> ProviderResult<Option<String>> {
        let stream = self.0.stream_chat(messages, cancel_token.clone()).await?;
        cancel_token
            .run_until(collect_text(stream))
            .await
            .unwrap_or(Err(ProviderError::Cancelled))
    }
}
