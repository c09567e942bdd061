//! Chat models backed by the genai crate
//!
//! Both models share one `GenaiBackend`, which owns the client, the resolved
//! configuration, retries, the timeout and request/response logging.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use genai::chat::{ChatOptions as GenaiOptions, ChatRequest};
use genai::Client;

use crate::builder::ResolvedModel;
use crate::logging::{Logger, NoOpLogger};
use crate::types::{CancellationToken, ChatMessage};
use crate::{log_debug, log_info, log_warn};

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{create_client, text_from_event, to_genai_messages, to_genai_options};
use super::traits::{collect_text, ChatModel, StreamResponse, StreamingChatModel};

struct GenaiBackend {
    resolved: ResolvedModel,
    client: Client,
    options: GenaiOptions,
    logger: Arc<dyn Logger>,
}

impl GenaiBackend {
    fn new(resolved: ResolvedModel) -> Self {
        let client = create_client(&resolved);
        let options = to_genai_options(resolved.configuration());
        Self {
            resolved,
            client,
            options,
            logger: Arc::new(NoOpLogger),
        }
    }

    fn provider_id(&self) -> &'static str {
        self.resolved.provider().id()
    }

    fn log_request(&self, messages: &[ChatMessage]) {
        if self.resolved.configuration().log_requests != Some(true) {
            return;
        }
        for msg in messages {
            log_info!(self.logger, "[{}] request {}: {}", self.provider_id(), msg.role, msg.content);
        }
    }

    fn log_response(&self, text: Option<&str>) {
        if self.resolved.configuration().log_responses == Some(true) {
            log_info!(
                self.logger,
                "[{}] response: {}",
                self.provider_id(),
                text.unwrap_or("<empty>")
            );
        }
    }

    /// Run `op` up to `1 + max_retries` times, each bounded by the timeout.
    /// Cancellation is never retried.
    async fn with_retries<T, F, Fut>(&self, mut op: F) -> ProviderResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        let config = self.resolved.configuration();
        let attempts = config.max_retries.unwrap_or(0).saturating_add(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            let result = match config.timeout {
                Some(limit) => match tokio::time::timeout(limit, op()).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::timeout(self.provider_id(), limit)),
                },
                None => op().await,
            };

            match result {
                Ok(value) => return Ok(value),
                Err(ProviderError::Cancelled) => return Err(ProviderError::Cancelled),
                Err(e) => {
                    log_warn!(
                        self.logger,
                        "[{}] attempt {}/{} failed: {}",
                        self.provider_id(),
                        attempt,
                        attempts,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::Other("no attempt was made".to_string())))
    }

    /// Start one streaming exchange with the backend
    async fn open(&self, messages: Vec<ChatMessage>) -> ProviderResult<StreamResponse> {
        let request = ChatRequest::new(to_genai_messages(messages));
        let provider = self.provider_id();

        let chat_stream = self
            .client
            .exec_chat_stream(self.resolved.model_name(), request, Some(&self.options))
            .await
            .map_err(|e| ProviderError::api_error(provider, e.to_string()))?;

        log_debug!(self.logger, "[{}] stream started for {}", provider, self.resolved.model_name());

        let stream = chat_stream.stream.filter_map(move |result| async move {
            match result {
                Ok(event) => text_from_event(event).map(Ok),
                Err(e) => Some(Err(ProviderError::api_error(provider, e.to_string()))),
            }
        });

        Ok(Box::pin(stream))
    }
}

/// Complete-answer model produced by `ChatModelBuilder::build`
pub struct GenaiChatModel {
    backend: GenaiBackend,
}

impl GenaiChatModel {
    pub fn new(resolved: ResolvedModel) -> Self {
        Self {
            backend: GenaiBackend::new(resolved),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.backend.logger = logger;
        self
    }

    /// Provider, model and the options this model honors
    pub fn resolved(&self) -> &ResolvedModel {
        &self.backend.resolved
    }
}

#[async_trait]
impl ChatModel for GenaiChatModel {
    fn model_name(&self) -> &str {
        self.backend.resolved.model_name()
    }

    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        cancel_token: CancellationToken,
    ) -> ProviderResult<Option<String>> {
        let backend = &self.backend;
        backend.log_request(&messages);

        let work = backend.with_retries(|| {
            let messages = messages.clone();
            async move {
                let stream = backend.open(messages).await?;
                collect_text(stream).await
            }
        });

        let text = cancel_token
            .run_until(work)
            .await
            .ok_or(ProviderError::Cancelled)??;

        backend.log_response(text.as_deref());
        Ok(text)
    }
}

/// Token-stream model produced by `ChatModelBuilder::build_streaming`
pub struct GenaiStreamingChatModel {
    backend: GenaiBackend,
}

impl GenaiStreamingChatModel {
    pub fn new(resolved: ResolvedModel) -> Self {
        Self {
            backend: GenaiBackend::new(resolved),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.backend.logger = logger;
        self
    }

    pub fn resolved(&self) -> &ResolvedModel {
        &self.backend.resolved
    }
}

#[async_trait]
impl StreamingChatModel for GenaiStreamingChatModel {
    fn model_name(&self) -> &str {
        self.backend.resolved.model_name()
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        let backend = &self.backend;
        backend.log_request(&messages);

        // Retries cover opening the stream only; tokens already delivered are never replayed
        let open = backend.with_retries(|| backend.open(messages.clone()));
        let stream = cancel_token
            .run_until(open)
            .await
            .ok_or(ProviderError::Cancelled)??;

        let logger = Arc::clone(&backend.logger);
        let log_chunks = backend.resolved.configuration().log_responses == Some(true);
        let provider = backend.provider_id();

        let stream = stream.map(move |chunk| {
            if cancel_token.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }
            if let (true, Ok(text)) = (log_chunks, &chunk) {
                log_debug!(logger, "[{}] chunk: {}", provider, text);
            }
            chunk
        });

        Ok(Box::pin(stream))
    }
}
