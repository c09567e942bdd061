//! The full set of tunables a caller may hand to any builder

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::provider::ProviderVariant;
use super::traits::ChatModelBuilder;

/// Names of the recognized model options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelOption {
    BaseUrl,
    ApiKey,
    CustomHeaders,
    ModelName,
    Temperature,
    TopP,
    TopK,
    MaxOutputTokens,
    MaxTokens,
    MaxCompletionTokens,
    PresencePenalty,
    FrequencyPenalty,
    RepeatPenalty,
    Seed,
    MaxRetries,
    Timeout,
    OrganizationId,
    LogRequestsResponses,
    AllowCodeExecution,
    IncludeCodeExecutionOutput,
}

impl ModelOption {
    pub const ALL: [ModelOption; 20] = [
        ModelOption::BaseUrl,
        ModelOption::ApiKey,
        ModelOption::CustomHeaders,
        ModelOption::ModelName,
        ModelOption::Temperature,
        ModelOption::TopP,
        ModelOption::TopK,
        ModelOption::MaxOutputTokens,
        ModelOption::MaxTokens,
        ModelOption::MaxCompletionTokens,
        ModelOption::PresencePenalty,
        ModelOption::FrequencyPenalty,
        ModelOption::RepeatPenalty,
        ModelOption::Seed,
        ModelOption::MaxRetries,
        ModelOption::Timeout,
        ModelOption::OrganizationId,
        ModelOption::LogRequestsResponses,
        ModelOption::AllowCodeExecution,
        ModelOption::IncludeCodeExecutionOutput,
    ];

    /// Config-file key for this option
    pub fn key(&self) -> &'static str {
        match self {
            ModelOption::BaseUrl => "base_url",
            ModelOption::ApiKey => "api_key",
            ModelOption::CustomHeaders => "custom_headers",
            ModelOption::ModelName => "model_name",
            ModelOption::Temperature => "temperature",
            ModelOption::TopP => "top_p",
            ModelOption::TopK => "top_k",
            ModelOption::MaxOutputTokens => "max_output_tokens",
            ModelOption::MaxTokens => "max_tokens",
            ModelOption::MaxCompletionTokens => "max_completion_tokens",
            ModelOption::PresencePenalty => "presence_penalty",
            ModelOption::FrequencyPenalty => "frequency_penalty",
            ModelOption::RepeatPenalty => "repeat_penalty",
            ModelOption::Seed => "seed",
            ModelOption::MaxRetries => "max_retries",
            ModelOption::Timeout => "timeout",
            ModelOption::OrganizationId => "organization_id",
            ModelOption::LogRequestsResponses => "log_requests_responses",
            ModelOption::AllowCodeExecution => "allow_code_execution",
            ModelOption::IncludeCodeExecutionOutput => "include_code_execution_output",
        }
    }
}

impl std::fmt::Display for ModelOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Model configuration, every field optional
///
/// Used both as the `model:` section of the config file and as the view of
/// what a built model actually honors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Whole seconds in the config file
    #[serde(with = "timeout_secs", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_requests: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_responses: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_code_execution: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_code_execution_output: Option<bool>,
}

impl ModelConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay every set field onto `builder` through the uniform setters
    pub fn apply<B: ChatModelBuilder>(&self, mut builder: B) -> B {
        if let Some(v) = &self.base_url {
            builder = builder.base_url(v.clone());
        }
        if let Some(v) = &self.api_key {
            builder = builder.api_key(v.clone());
        }
        if let Some(v) = &self.custom_headers {
            builder = builder.custom_headers(v.clone());
        }
        if let Some(v) = &self.model_name {
            builder = builder.model_name(v.clone());
        }
        if let Some(v) = self.temperature {
            builder = builder.temperature(v);
        }
        if let Some(v) = self.top_p {
            builder = builder.top_p(v);
        }
        if let Some(v) = self.top_k {
            builder = builder.top_k(v);
        }
        if let Some(v) = self.max_output_tokens {
            builder = builder.max_output_tokens(v);
        }
        if let Some(v) = self.max_tokens {
            builder = builder.max_tokens(v);
        }
        if let Some(v) = self.max_completion_tokens {
            builder = builder.max_completion_tokens(v);
        }
        if let Some(v) = self.presence_penalty {
            builder = builder.presence_penalty(v);
        }
        if let Some(v) = self.frequency_penalty {
            builder = builder.frequency_penalty(v);
        }
        if let Some(v) = self.repeat_penalty {
            builder = builder.repeat_penalty(v);
        }
        if let Some(v) = self.seed {
            builder = builder.seed(v);
        }
        if let Some(v) = self.max_retries {
            builder = builder.max_retries(v);
        }
        if let Some(v) = self.timeout {
            builder = builder.timeout(v);
        }
        if let Some(v) = &self.organization_id {
            builder = builder.organization_id(v.clone());
        }
        if self.log_requests.is_some() || self.log_responses.is_some() {
            builder = builder.log_requests_responses(
                self.log_requests.unwrap_or(false),
                self.log_responses.unwrap_or(false),
            );
        }
        if let Some(v) = self.allow_code_execution {
            builder = builder.allow_code_execution(v);
        }
        if let Some(v) = self.include_code_execution_output {
            builder = builder.include_code_execution_output(v);
        }
        builder
    }

    /// Whether `option` carries a value
    pub fn is_set(&self, option: ModelOption) -> bool {
        match option {
            ModelOption::BaseUrl => self.base_url.is_some(),
            ModelOption::ApiKey => self.api_key.is_some(),
            ModelOption::CustomHeaders => self.custom_headers.is_some(),
            ModelOption::ModelName => self.model_name.is_some(),
            ModelOption::Temperature => self.temperature.is_some(),
            ModelOption::TopP => self.top_p.is_some(),
            ModelOption::TopK => self.top_k.is_some(),
            ModelOption::MaxOutputTokens => self.max_output_tokens.is_some(),
            ModelOption::MaxTokens => self.max_tokens.is_some(),
            ModelOption::MaxCompletionTokens => self.max_completion_tokens.is_some(),
            ModelOption::PresencePenalty => self.presence_penalty.is_some(),
            ModelOption::FrequencyPenalty => self.frequency_penalty.is_some(),
            ModelOption::RepeatPenalty => self.repeat_penalty.is_some(),
            ModelOption::Seed => self.seed.is_some(),
            ModelOption::MaxRetries => self.max_retries.is_some(),
            ModelOption::Timeout => self.timeout.is_some(),
            ModelOption::OrganizationId => self.organization_id.is_some(),
            ModelOption::LogRequestsResponses => {
                self.log_requests.is_some() || self.log_responses.is_some()
            }
            ModelOption::AllowCodeExecution => self.allow_code_execution.is_some(),
            ModelOption::IncludeCodeExecutionOutput => self.include_code_execution_output.is_some(),
        }
    }

    /// Options set here that `provider` will drop on the floor
    pub fn ignored_by(&self, provider: ProviderVariant) -> Vec<ModelOption> {
        ModelOption::ALL
            .iter()
            .copied()
            .filter(|o| self.is_set(*o) && !provider.honors(*o))
            .collect()
    }

    /// The token ceiling to send, whichever of the three knobs was honored
    pub fn effective_max_tokens(&self) -> Option<u32> {
        self.max_completion_tokens
            .or(self.max_tokens)
            .or(self.max_output_tokens)
    }
}

mod timeout_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_u64(d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_round_trip() {
        let yaml = r#"
model_name: gpt-4o
temperature: 0.2
timeout: 30
log_requests: true
custom_headers:
  X-Team: editor
"#;
        let config: ModelConfiguration = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.model_name.as_deref(), Some("gpt-4o"));
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.log_requests, Some(true));
        assert_eq!(config.log_responses, None);
        assert_eq!(
            config.custom_headers.as_ref().and_then(|h| h.get("X-Team")).map(String::as_str),
            Some("editor")
        );

        let back = serde_yaml::to_string(&config).unwrap();
        assert!(back.contains("timeout: 30"));
        assert!(!back.contains("seed"));
    }

    #[test]
    fn test_is_set_and_ignored_by() {
        let config = ModelConfiguration {
            model_name: Some("claude-3-haiku-20240307".into()),
            seed: Some(7),
            top_k: Some(40),
            ..Default::default()
        };
        assert!(config.is_set(ModelOption::Seed));
        assert!(!config.is_set(ModelOption::TopP));

        assert_eq!(
            config.ignored_by(ProviderVariant::Anthropic),
            vec![ModelOption::TopK, ModelOption::Seed]
        );
        assert_eq!(config.ignored_by(ProviderVariant::Ollama), vec![ModelOption::TopK]);

        let seeded = ModelConfiguration {
            seed: Some(7),
            ..Default::default()
        };
        assert!(seeded.ignored_by(ProviderVariant::OpenAi).is_empty());
    }

    #[test]
    fn test_effective_max_tokens_preference() {
        let mut config = ModelConfiguration {
            max_output_tokens: Some(100),
            ..Default::default()
        };
        assert_eq!(config.effective_max_tokens(), Some(100));
        config.max_tokens = Some(200);
        assert_eq!(config.effective_max_tokens(), Some(200));
        config.max_completion_tokens = Some(300);
        assert_eq!(config.effective_max_tokens(), Some(300));
    }

    #[test]
    fn test_option_keys_are_unique() {
        let mut keys: Vec<_> = ModelOption::ALL.iter().map(|o| o.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), ModelOption::ALL.len());
    }
}
