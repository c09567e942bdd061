//! Mock chat model for testing
//!
//! Deterministic, configurable answers without network dependencies. Records
//! every conversation it receives so tests can assert on prompts.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use super::error::{ProviderError, ProviderResult};
use super::traits::{ChatModel, StreamResponse, StreamingChatModel};
use crate::log_debug;
use crate::logging::{Logger, NoOpLogger};
use crate::types::{CancellationToken, ChatMessage};

/// Streaming chunk length for fixed answers, in characters
const CHUNK_SIZE: usize = 10;

/// Mock response mode
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Return a fixed response
    Fixed(String),
    /// Return response as specific chunks
    Chunks(Vec<String>),
    /// Fail with a provider error
    Error(String),
    /// Return nothing (empty response)
    Empty,
}

/// Mock chat model for testing
pub struct MockChatModel {
    mode: MockMode,
    delay: Duration,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    logger: Arc<dyn Logger>,
}

impl MockChatModel {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
            logger: Arc::new(NoOpLogger),
        }
    }

    /// Create a fixed response model
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::new(MockMode::Fixed(response.into()))
    }

    /// Create a chunked response model
    pub fn chunked(chunks: Vec<String>) -> Self {
        Self::new(MockMode::Chunks(chunks))
    }

    /// Create an error-producing model
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(MockMode::Error(message.into()))
    }

    /// Create a model that answers with no content
    pub fn empty() -> Self {
        Self::new(MockMode::Empty)
    }

    /// Wait this long before answering (cancellable)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Number of conversations received
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Every conversation received, oldest first
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().clone()
    }

    fn response_chunks(&self) -> ProviderResult<Vec<String>> {
        match &self.mode {
            MockMode::Fixed(response) => Ok(split_into_chunks(response)),
            MockMode::Chunks(chunks) => Ok(chunks.clone()),
            MockMode::Empty => Ok(vec![]),
            MockMode::Error(message) => Err(ProviderError::Other(format!("Mock error: {}", message))),
        }
    }

    async fn answer(
        &self,
        messages: Vec<ChatMessage>,
        cancel_token: &CancellationToken,
    ) -> ProviderResult<Vec<String>> {
        log_debug!(self.logger, "MockChatModel: {:?} mode, {} messages", self.mode, messages.len());
        self.requests.lock().push(messages);

        if !self.delay.is_zero() {
            cancel_token
                .run_until(tokio::time::sleep(self.delay))
                .await
                .ok_or(ProviderError::Cancelled)?;
        } else if cancel_token.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        self.response_chunks()
    }
}

fn split_into_chunks(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    text.chars()
        .collect::<Vec<_>>()
        .chunks(CHUNK_SIZE)
        .map(|c| c.iter().collect())
        .collect()
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        cancel_token: CancellationToken,
    ) -> ProviderResult<Option<String>> {
        let text = self.answer(messages, &cancel_token).await?.concat();
        Ok(if text.is_empty() { None } else { Some(text) })
    }
}

#[async_trait]
impl StreamingChatModel for MockChatModel {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        let chunks = self.answer(messages, &cancel_token).await?;

        let stream = stream::iter(chunks).map(move |chunk| {
            if cancel_token.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }
            Ok(chunk)
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{collect_text, Collected};

    fn test_messages(content: &str) -> Vec<ChatMessage> {
        vec![ChatMessage::system("rules"), ChatMessage::user(content)]
    }

    #[tokio::test]
    async fn test_fixed_mode_records_requests() {
        let model = MockChatModel::fixed(r#"{"imports":[]}"#);
        let result = model
            .chat(test_messages("Hello, world!"), CancellationToken::new())
            .await
            .expect("chat should succeed");

        assert_eq!(result.as_deref(), Some(r#"{"imports":[]}"#));
        assert_eq!(model.call_count(), 1);
        assert_eq!(model.requests()[0].len(), 2);
        assert_eq!(model.requests()[0][1].content, "Hello, world!");
    }

    #[tokio::test]
    async fn test_fixed_mode_streams_in_chunks() {
        let model = MockChatModel::fixed("This is a test response.");
        let mut stream = model
            .stream_chat(test_messages("Anything"), CancellationToken::new())
            .await
            .expect("stream should start");

        let mut received = Vec::new();
        while let Some(chunk) = stream.next().await {
            received.push(chunk.expect("chunk should succeed"));
        }

        assert_eq!(received, vec!["This is a ", "test respo", "nse."]);
    }

    #[tokio::test]
    async fn test_chunked_mode_collects() {
        let chunks = vec!["First ".to_string(), "second ".to_string(), "third.".to_string()];
        let model = MockChatModel::chunked(chunks);
        let stream = model
            .stream_chat(test_messages("Anything"), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(collect_text(stream).await.unwrap().as_deref(), Some("First second third."));
    }

    #[tokio::test]
    async fn test_empty_mode() {
        let model = MockChatModel::empty();
        let result = model.chat(test_messages("x"), CancellationToken::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_error_mode() {
        let model = MockChatModel::error("Test error message");
        let result = model.chat(test_messages("x"), CancellationToken::new()).await;
        assert!(matches!(result, Err(ProviderError::Other(m)) if m.contains("Test error message")));
    }

    #[tokio::test]
    async fn test_cancellation_during_delay() {
        let model = Arc::new(MockChatModel::fixed("late").with_delay(Duration::from_secs(5)));
        let cancel = CancellationToken::new();

        let task = {
            let model = Arc::clone(&model);
            let cancel = cancel.clone();
            tokio::spawn(async move { model.chat(test_messages("x"), cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(ProviderError::Cancelled)));
    }

    #[tokio::test]
    async fn test_collected_adapter() {
        let model = Collected(MockChatModel::chunked(vec!["{\"a\":".into(), "1}".into()]));
        let text = model.chat(test_messages("x"), CancellationToken::new()).await.unwrap();
        assert_eq!(text.as_deref(), Some("{\"a\":1}"));
        assert_eq!(ChatModel::model_name(&model), "mock");
    }
}
