//! Adapter between llmfix types and genai types
//!
//! Every variant is routed explicitly: the service target resolver pins the
//! endpoint and adapter kind from the resolved model rather than letting
//! genai guess from the model name.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatStreamEvent};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};

use crate::builder::{ModelConfiguration, ProviderVariant, ResolvedModel};
use crate::types::{ChatMessage, MessageRole};

// ============================================================================
// Message Conversion: llmfix -> genai
// ============================================================================

/// Convert a llmfix ChatMessage to a genai ChatMessage
pub fn to_genai_message(msg: ChatMessage) -> GenaiMessage {
    match msg.role {
        MessageRole::System => GenaiMessage::system(msg.content),
        MessageRole::User => GenaiMessage::user(msg.content),
        MessageRole::Assistant => GenaiMessage::assistant(msg.content),
    }
}

pub fn to_genai_messages(messages: Vec<ChatMessage>) -> Vec<GenaiMessage> {
    messages.into_iter().map(to_genai_message).collect()
}

// ============================================================================
// Options Conversion
// ============================================================================

/// Header OpenAI reads the organization id from
const ORGANIZATION_HEADER: &str = "OpenAI-Organization";

/// Request options genai forwards on the wire
///
/// Only honored options are present in a resolved configuration, so
/// everything set here was meant to be sent.
pub fn to_genai_options(config: &ModelConfiguration) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = config.temperature {
        genai_opts = genai_opts.with_temperature(temp);
    }

    if let Some(top_p) = config.top_p {
        genai_opts = genai_opts.with_top_p(top_p);
    }

    if let Some(max_tokens) = config.effective_max_tokens() {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    if let Some(seed) = config.seed {
        genai_opts = genai_opts.with_seed(seed);
    }

    let headers = request_headers(config);
    if !headers.is_empty() {
        genai_opts = genai_opts.with_extra_headers(headers);
    }

    genai_opts
}

/// Custom headers plus the organization header, merged into every request
fn request_headers(config: &ModelConfiguration) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = config
        .custom_headers
        .iter()
        .flatten()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    if let Some(org) = &config.organization_id {
        headers.push((ORGANIZATION_HEADER.to_string(), org.clone()));
    }
    headers
}

// ============================================================================
// Response Conversion: genai -> llmfix
// ============================================================================

/// Text carried by a stream event, if any
pub fn text_from_event(event: ChatStreamEvent) -> Option<String> {
    match event {
        ChatStreamEvent::Chunk(chunk) if !chunk.content.is_empty() => Some(chunk.content),
        _ => None,
    }
}

// ============================================================================
// Provider Routing
// ============================================================================

/// genai adapter speaking each variant's wire protocol
pub fn adapter_kind(provider: ProviderVariant) -> AdapterKind {
    match provider {
        ProviderVariant::Anthropic => AdapterKind::Anthropic,
        ProviderVariant::Google => AdapterKind::Gemini,
        // Mistral, LocalAI and Ollama all expose OpenAI-compatible chat endpoints
        ProviderVariant::OpenAi
        | ProviderVariant::Mistral
        | ProviderVariant::LocalAi
        | ProviderVariant::Ollama => AdapterKind::OpenAI,
    }
}

/// Bearer sent to self-hosted servers; the OpenAI adapter refuses to run keyless
const SELF_HOSTED_KEY: &str = "self-hosted";

/// Configured key first, then the provider's conventional env var
fn resolve_api_key(provider: ProviderVariant, explicit: Option<String>) -> Option<String> {
    if provider.api_key_env().is_none() {
        return Some(SELF_HOSTED_KEY.to_string());
    }
    explicit.or_else(|| {
        provider
            .api_key_env()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty())
    })
}

/// Create a genai Client routed to the resolved model's endpoint
///
/// Building the client performs no I/O.
pub fn create_client(resolved: &ResolvedModel) -> Client {
    let provider = resolved.provider();
    let explicit_api_key = resolved.configuration().api_key.clone();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let explicit_key = explicit_api_key.clone();

            Box::pin(async move {
                Ok(resolve_api_key(provider, explicit_key).map(AuthData::from_single))
            })
        },
    );

    let endpoint = resolved.endpoint();
    let kind = adapter_kind(provider);

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let ServiceTarget { ref model, .. } = target;
            let resolved_model = ModelIden::new(kind, model.model_name.clone());

            Ok(ServiceTarget {
                endpoint: Endpoint::from_owned(endpoint.clone()),
                auth: target.auth, // Auth is handled by AuthResolver
                model: resolved_model,
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}
