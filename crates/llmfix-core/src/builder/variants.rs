//! Concrete builders, one per provider variant
//!
//! Each struct stores only the options its provider honors, which are the
//! ones that reach the wire. Everything else goes through `ignore_options!`
//! and is dropped without error.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::catalog;

use super::error::{BuildResult, ConfigurationError};
use super::options::{ModelConfiguration, ModelOption};
use super::provider::ProviderVariant;
use super::traits::{ChatModelBuilder, ResolvedModel};

fn default_model(provider: ProviderVariant, model_name: Option<String>) -> BuildResult<String> {
    model_name
        .or_else(|| catalog::default_model_for(provider).map(str::to_string))
        .ok_or_else(|| ConfigurationError::missing(provider, ModelOption::ModelName))
}

/// OpenAI chat completions
#[derive(Debug, Clone, Default)]
pub struct OpenAiBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    custom_headers: Option<BTreeMap<String, String>>,
    model_name: Option<String>,
    temperature: Option<f64>,
    top_p: Option<f64>,
    max_tokens: Option<u32>,
    max_completion_tokens: Option<u32>,
    seed: Option<u64>,
    max_retries: Option<u32>,
    timeout: Option<Duration>,
    organization_id: Option<String>,
    log_requests: Option<bool>,
    log_responses: Option<bool>,
}

impl ChatModelBuilder for OpenAiBuilder {
    honor_options! {
        base_url, api_key, custom_headers, model_name,
        temperature: f64, top_p: f64, max_tokens: u32, max_completion_tokens: u32,
        seed: u64, max_retries: u32, timeout, organization_id, log_requests_responses,
    }
    ignore_options! {
        top_k: u32, max_output_tokens: u32,
        presence_penalty: f64, frequency_penalty: f64, repeat_penalty: f64,
        allow_code_execution: bool, include_code_execution_output: bool,
    }

    fn resolve(self) -> BuildResult<ResolvedModel> {
        let provider = ProviderVariant::OpenAi;
        let model_name = default_model(provider, self.model_name)?;
        Ok(ResolvedModel::new(
            provider,
            model_name,
            ModelConfiguration {
                base_url: self.base_url,
                api_key: self.api_key,
                custom_headers: self.custom_headers,
                temperature: self.temperature,
                top_p: self.top_p,
                max_tokens: self.max_tokens,
                max_completion_tokens: self.max_completion_tokens,
                seed: self.seed,
                max_retries: self.max_retries,
                timeout: self.timeout,
                organization_id: self.organization_id,
                log_requests: self.log_requests,
                log_responses: self.log_responses,
                ..Default::default()
            },
        ))
    }
}

/// Anthropic messages API
#[derive(Debug, Clone, Default)]
pub struct AnthropicBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    model_name: Option<String>,
    temperature: Option<f64>,
    top_p: Option<f64>,
    max_tokens: Option<u32>,
    max_retries: Option<u32>,
    timeout: Option<Duration>,
    log_requests: Option<bool>,
    log_responses: Option<bool>,
}

impl ChatModelBuilder for AnthropicBuilder {
    honor_options! {
        base_url, api_key, model_name,
        temperature: f64, top_p: f64, max_tokens: u32, max_retries: u32,
        timeout, log_requests_responses,
    }
    ignore_options! {
        custom_headers, organization_id,
        top_k: u32, max_output_tokens: u32, max_completion_tokens: u32,
        presence_penalty: f64, frequency_penalty: f64, repeat_penalty: f64, seed: u64,
        allow_code_execution: bool, include_code_execution_output: bool,
    }

    fn resolve(self) -> BuildResult<ResolvedModel> {
        let provider = ProviderVariant::Anthropic;
        let model_name = default_model(provider, self.model_name)?;
        Ok(ResolvedModel::new(
            provider,
            model_name,
            ModelConfiguration {
                base_url: self.base_url,
                api_key: self.api_key,
                temperature: self.temperature,
                top_p: self.top_p,
                max_tokens: self.max_tokens,
                max_retries: self.max_retries,
                timeout: self.timeout,
                log_requests: self.log_requests,
                log_responses: self.log_responses,
                ..Default::default()
            },
        ))
    }
}

/// Google Gemini
#[derive(Debug, Clone, Default)]
pub struct GoogleBuilder {
    api_key: Option<String>,
    model_name: Option<String>,
    temperature: Option<f64>,
    top_p: Option<f64>,
    max_output_tokens: Option<u32>,
    max_retries: Option<u32>,
    timeout: Option<Duration>,
    log_requests: Option<bool>,
    log_responses: Option<bool>,
}

impl ChatModelBuilder for GoogleBuilder {
    honor_options! {
        api_key, model_name,
        temperature: f64, top_p: f64, max_output_tokens: u32, max_retries: u32,
        timeout, log_requests_responses,
    }
    ignore_options! {
        base_url, custom_headers, organization_id,
        top_k: u32, max_tokens: u32, max_completion_tokens: u32,
        presence_penalty: f64, frequency_penalty: f64, repeat_penalty: f64, seed: u64,
        allow_code_execution: bool, include_code_execution_output: bool,
    }

    fn resolve(self) -> BuildResult<ResolvedModel> {
        let provider = ProviderVariant::Google;
        let model_name = default_model(provider, self.model_name)?;
        Ok(ResolvedModel::new(
            provider,
            model_name,
            ModelConfiguration {
                api_key: self.api_key,
                temperature: self.temperature,
                top_p: self.top_p,
                max_output_tokens: self.max_output_tokens,
                max_retries: self.max_retries,
                timeout: self.timeout,
                log_requests: self.log_requests,
                log_responses: self.log_responses,
                ..Default::default()
            },
        ))
    }
}

/// Mistral La Plateforme
#[derive(Debug, Clone, Default)]
pub struct MistralBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    model_name: Option<String>,
    temperature: Option<f64>,
    top_p: Option<f64>,
    max_tokens: Option<u32>,
    seed: Option<u64>,
    max_retries: Option<u32>,
    timeout: Option<Duration>,
    log_requests: Option<bool>,
    log_responses: Option<bool>,
}

impl ChatModelBuilder for MistralBuilder {
    honor_options! {
        base_url, api_key, model_name,
        temperature: f64, top_p: f64, max_tokens: u32, seed: u64, max_retries: u32,
        timeout, log_requests_responses,
    }
    ignore_options! {
        custom_headers, organization_id,
        top_k: u32, max_output_tokens: u32, max_completion_tokens: u32,
        presence_penalty: f64, frequency_penalty: f64, repeat_penalty: f64,
        allow_code_execution: bool, include_code_execution_output: bool,
    }

    fn resolve(self) -> BuildResult<ResolvedModel> {
        let provider = ProviderVariant::Mistral;
        let model_name = default_model(provider, self.model_name)?;
        Ok(ResolvedModel::new(
            provider,
            model_name,
            ModelConfiguration {
                base_url: self.base_url,
                api_key: self.api_key,
                temperature: self.temperature,
                top_p: self.top_p,
                max_tokens: self.max_tokens,
                seed: self.seed,
                max_retries: self.max_retries,
                timeout: self.timeout,
                log_requests: self.log_requests,
                log_responses: self.log_responses,
                ..Default::default()
            },
        ))
    }
}

/// Self-hosted LocalAI (OpenAI-compatible); base URL and model are mandatory
#[derive(Debug, Clone, Default)]
pub struct LocalAiBuilder {
    base_url: Option<String>,
    model_name: Option<String>,
    temperature: Option<f64>,
    top_p: Option<f64>,
    max_tokens: Option<u32>,
    max_retries: Option<u32>,
    timeout: Option<Duration>,
    log_requests: Option<bool>,
    log_responses: Option<bool>,
}

impl ChatModelBuilder for LocalAiBuilder {
    honor_options! {
        base_url, model_name,
        temperature: f64, top_p: f64, max_tokens: u32, max_retries: u32,
        timeout, log_requests_responses,
    }
    ignore_options! {
        api_key, custom_headers, organization_id,
        top_k: u32, max_output_tokens: u32, max_completion_tokens: u32,
        presence_penalty: f64, frequency_penalty: f64, repeat_penalty: f64, seed: u64,
        allow_code_execution: bool, include_code_execution_output: bool,
    }

    fn resolve(self) -> BuildResult<ResolvedModel> {
        let provider = ProviderVariant::LocalAi;
        let base_url = self
            .base_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ConfigurationError::missing(provider, ModelOption::BaseUrl))?;
        let model_name = default_model(provider, self.model_name)?;
        Ok(ResolvedModel::new(
            provider,
            model_name,
            ModelConfiguration {
                base_url: Some(base_url),
                temperature: self.temperature,
                top_p: self.top_p,
                max_tokens: self.max_tokens,
                max_retries: self.max_retries,
                timeout: self.timeout,
                log_requests: self.log_requests,
                log_responses: self.log_responses,
                ..Default::default()
            },
        ))
    }
}

/// Ollama; model is mandatory, base URL defaults to localhost
#[derive(Debug, Clone, Default)]
pub struct OllamaBuilder {
    base_url: Option<String>,
    custom_headers: Option<BTreeMap<String, String>>,
    model_name: Option<String>,
    temperature: Option<f64>,
    top_p: Option<f64>,
    max_tokens: Option<u32>,
    seed: Option<u64>,
    max_retries: Option<u32>,
    timeout: Option<Duration>,
    log_requests: Option<bool>,
    log_responses: Option<bool>,
}

impl ChatModelBuilder for OllamaBuilder {
    honor_options! {
        base_url, custom_headers, model_name,
        temperature: f64, top_p: f64, max_tokens: u32, seed: u64, max_retries: u32,
        timeout, log_requests_responses,
    }
    ignore_options! {
        api_key, organization_id,
        top_k: u32, max_output_tokens: u32, max_completion_tokens: u32,
        presence_penalty: f64, frequency_penalty: f64, repeat_penalty: f64,
        allow_code_execution: bool, include_code_execution_output: bool,
    }

    fn resolve(self) -> BuildResult<ResolvedModel> {
        let provider = ProviderVariant::Ollama;
        let model_name = default_model(provider, self.model_name)?;
        Ok(ResolvedModel::new(
            provider,
            model_name,
            ModelConfiguration {
                base_url: self.base_url,
                custom_headers: self.custom_headers,
                temperature: self.temperature,
                top_p: self.top_p,
                max_tokens: self.max_tokens,
                seed: self.seed,
                max_retries: self.max_retries,
                timeout: self.timeout,
                log_requests: self.log_requests,
                log_responses: self.log_responses,
                ..Default::default()
            },
        ))
    }
}
