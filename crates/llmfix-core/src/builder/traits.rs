//! Builder trait shared by every provider variant

use std::collections::BTreeMap;
use std::time::Duration;

use crate::providers::{GenaiChatModel, GenaiStreamingChatModel};

use super::error::BuildResult;
use super::options::ModelConfiguration;
use super::provider::ProviderVariant;

/// Fluent configuration interface, one setter per `ModelOption`
///
/// Every variant implements every setter. A variant that cannot honor an
/// option returns itself unchanged; it never fails. Only the terminal
/// `build` / `build_streaming` can fail, and only for a missing
/// variant-mandatory field. No I/O happens before the built model is called.
pub trait ChatModelBuilder: Sized {
    fn base_url(self, base_url: impl Into<String>) -> Self;
    fn api_key(self, api_key: impl Into<String>) -> Self;
    fn custom_headers(self, custom_headers: BTreeMap<String, String>) -> Self;
    fn model_name(self, model_name: impl Into<String>) -> Self;
    fn temperature(self, temperature: f64) -> Self;
    fn top_p(self, top_p: f64) -> Self;
    fn top_k(self, top_k: u32) -> Self;
    fn max_output_tokens(self, max_output_tokens: u32) -> Self;
    fn max_tokens(self, max_tokens: u32) -> Self;
    fn max_completion_tokens(self, max_completion_tokens: u32) -> Self;
    fn presence_penalty(self, presence_penalty: f64) -> Self;
    fn frequency_penalty(self, frequency_penalty: f64) -> Self;
    fn repeat_penalty(self, repeat_penalty: f64) -> Self;
    fn seed(self, seed: u64) -> Self;
    fn max_retries(self, max_retries: u32) -> Self;
    fn timeout(self, timeout: Duration) -> Self;
    fn organization_id(self, organization_id: impl Into<String>) -> Self;
    fn log_requests_responses(self, log_requests: bool, log_responses: bool) -> Self;
    fn allow_code_execution(self, allow_code_execution: bool) -> Self;
    fn include_code_execution_output(self, include_code_execution_output: bool) -> Self;

    /// Validate mandatory fields and fix the honored configuration
    fn resolve(self) -> BuildResult<ResolvedModel>;

    /// Build a model answering with the complete text
    fn build(self) -> BuildResult<GenaiChatModel> {
        Ok(GenaiChatModel::new(self.resolve()?))
    }

    /// Build a model answering with a token stream
    fn build_streaming(self) -> BuildResult<GenaiStreamingChatModel> {
        Ok(GenaiStreamingChatModel::new(self.resolve()?))
    }
}

/// Output of a successful `resolve`: the variant plus exactly the options it honors
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    provider: ProviderVariant,
    model_name: String,
    configuration: ModelConfiguration,
}

impl ResolvedModel {
    pub(crate) fn new(
        provider: ProviderVariant,
        model_name: String,
        mut configuration: ModelConfiguration,
    ) -> Self {
        configuration.model_name = Some(model_name.clone());
        Self {
            provider,
            model_name,
            configuration,
        }
    }

    pub fn provider(&self) -> ProviderVariant {
        self.provider
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Honored options only
    pub fn configuration(&self) -> &ModelConfiguration {
        &self.configuration
    }

    /// API base to call, always with a trailing slash
    ///
    /// Empty only for a variant without a default that reached here without
    /// a base URL, which `resolve` rules out.
    pub fn endpoint(&self) -> String {
        let base = self
            .configuration
            .base_url
            .as_deref()
            .or_else(|| self.provider.default_api_base())
            .unwrap_or_default();
        if base.is_empty() || base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        }
    }
}
