//! Tagged dispatch over the provider variants
//!
//! Callers configure any provider through the same call sequence; each arm
//! forwards to the variant's own setter, which decides whether to keep the
//! value.

use std::collections::BTreeMap;
use std::time::Duration;

use super::error::BuildResult;
use super::provider::ProviderVariant;
use super::traits::{ChatModelBuilder, ResolvedModel};
use super::variants::{
    AnthropicBuilder, GoogleBuilder, LocalAiBuilder, MistralBuilder, OllamaBuilder, OpenAiBuilder,
};

/// One builder per variant, selected at runtime
#[derive(Debug, Clone)]
pub enum ProviderBuilder {
    OpenAi(OpenAiBuilder),
    Anthropic(AnthropicBuilder),
    Google(GoogleBuilder),
    Mistral(MistralBuilder),
    LocalAi(LocalAiBuilder),
    Ollama(OllamaBuilder),
}

macro_rules! forward {
    ($self:ident, $b:ident => $call:expr) => {
        match $self {
            ProviderBuilder::OpenAi($b) => ProviderBuilder::OpenAi($call),
            ProviderBuilder::Anthropic($b) => ProviderBuilder::Anthropic($call),
            ProviderBuilder::Google($b) => ProviderBuilder::Google($call),
            ProviderBuilder::Mistral($b) => ProviderBuilder::Mistral($call),
            ProviderBuilder::LocalAi($b) => ProviderBuilder::LocalAi($call),
            ProviderBuilder::Ollama($b) => ProviderBuilder::Ollama($call),
        }
    };
}

impl ProviderBuilder {
    pub fn new(provider: ProviderVariant) -> Self {
        match provider {
            ProviderVariant::OpenAi => ProviderBuilder::OpenAi(OpenAiBuilder::default()),
            ProviderVariant::Anthropic => ProviderBuilder::Anthropic(AnthropicBuilder::default()),
            ProviderVariant::Google => ProviderBuilder::Google(GoogleBuilder::default()),
            ProviderVariant::Mistral => ProviderBuilder::Mistral(MistralBuilder::default()),
            ProviderVariant::LocalAi => ProviderBuilder::LocalAi(LocalAiBuilder::default()),
            ProviderVariant::Ollama => ProviderBuilder::Ollama(OllamaBuilder::default()),
        }
    }

    pub fn provider(&self) -> ProviderVariant {
        match self {
            ProviderBuilder::OpenAi(_) => ProviderVariant::OpenAi,
            ProviderBuilder::Anthropic(_) => ProviderVariant::Anthropic,
            ProviderBuilder::Google(_) => ProviderVariant::Google,
            ProviderBuilder::Mistral(_) => ProviderVariant::Mistral,
            ProviderBuilder::LocalAi(_) => ProviderVariant::LocalAi,
            ProviderBuilder::Ollama(_) => ProviderVariant::Ollama,
        }
    }
}

impl ChatModelBuilder for ProviderBuilder {
    fn base_url(self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        forward!(self, b => b.base_url(base_url))
    }

    fn api_key(self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        forward!(self, b => b.api_key(api_key))
    }

    fn custom_headers(self, custom_headers: BTreeMap<String, String>) -> Self {
        forward!(self, b => b.custom_headers(custom_headers))
    }

    fn model_name(self, model_name: impl Into<String>) -> Self {
        let model_name = model_name.into();
        forward!(self, b => b.model_name(model_name))
    }

    fn temperature(self, temperature: f64) -> Self {
        forward!(self, b => b.temperature(temperature))
    }

    fn top_p(self, top_p: f64) -> Self {
        forward!(self, b => b.top_p(top_p))
    }

    fn top_k(self, top_k: u32) -> Self {
        forward!(self, b => b.top_k(top_k))
    }

    fn max_output_tokens(self, max_output_tokens: u32) -> Self {
        forward!(self, b => b.max_output_tokens(max_output_tokens))
    }

    fn max_tokens(self, max_tokens: u32) -> Self {
        forward!(self, b => b.max_tokens(max_tokens))
    }

    fn max_completion_tokens(self, max_completion_tokens: u32) -> Self {
        forward!(self, b => b.max_completion_tokens(max_completion_tokens))
    }

    fn presence_penalty(self, presence_penalty: f64) -> Self {
        forward!(self, b => b.presence_penalty(presence_penalty))
    }

    fn frequency_penalty(self, frequency_penalty: f64) -> Self {
        forward!(self, b => b.frequency_penalty(frequency_penalty))
    }

    fn repeat_penalty(self, repeat_penalty: f64) -> Self {
        forward!(self, b => b.repeat_penalty(repeat_penalty))
    }

    fn seed(self, seed: u64) -> Self {
        forward!(self, b => b.seed(seed))
    }

    fn max_retries(self, max_retries: u32) -> Self {
        forward!(self, b => b.max_retries(max_retries))
    }

    fn timeout(self, timeout: Duration) -> Self {
        forward!(self, b => b.timeout(timeout))
    }

    fn organization_id(self, organization_id: impl Into<String>) -> Self {
        let organization_id = organization_id.into();
        forward!(self, b => b.organization_id(organization_id))
    }

    fn log_requests_responses(self, log_requests: bool, log_responses: bool) -> Self {
        forward!(self, b => b.log_requests_responses(log_requests, log_responses))
    }

    fn allow_code_execution(self, allow_code_execution: bool) -> Self {
        forward!(self, b => b.allow_code_execution(allow_code_execution))
    }

    fn include_code_execution_output(self, include_code_execution_output: bool) -> Self {
        forward!(self, b => b.include_code_execution_output(include_code_execution_output))
    }

    fn resolve(self) -> BuildResult<ResolvedModel> {
        match self {
            ProviderBuilder::OpenAi(b) => b.resolve(),
            ProviderBuilder::Anthropic(b) => b.resolve(),
            ProviderBuilder::Google(b) => b.resolve(),
            ProviderBuilder::Mistral(b) => b.resolve(),
            ProviderBuilder::LocalAi(b) => b.resolve(),
            ProviderBuilder::Ollama(b) => b.resolve(),
        }
    }
}
