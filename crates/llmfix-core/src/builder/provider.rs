//! Provider variants and their capability table

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::dispatch::ProviderBuilder;
use super::error::ConfigurationError;
use super::options::ModelOption;

/// The fixed set of backends a builder can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderVariant {
    #[serde(rename = "openai", alias = "open_ai")]
    OpenAi,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "google", alias = "gemini")]
    Google,
    #[serde(rename = "mistral")]
    Mistral,
    /// Self-hosted LocalAI or any OpenAI-compatible server
    #[serde(rename = "localai", alias = "local")]
    LocalAi,
    #[serde(rename = "ollama")]
    Ollama,
}

impl ProviderVariant {
    pub const ALL: [ProviderVariant; 6] = [
        ProviderVariant::OpenAi,
        ProviderVariant::Anthropic,
        ProviderVariant::Google,
        ProviderVariant::Mistral,
        ProviderVariant::LocalAi,
        ProviderVariant::Ollama,
    ];

    /// Stable identifier, matching the serde name
    pub fn id(&self) -> &'static str {
        match self {
            ProviderVariant::OpenAi => "openai",
            ProviderVariant::Anthropic => "anthropic",
            ProviderVariant::Google => "google",
            ProviderVariant::Mistral => "mistral",
            ProviderVariant::LocalAi => "localai",
            ProviderVariant::Ollama => "ollama",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderVariant::OpenAi => "OpenAI",
            ProviderVariant::Anthropic => "Anthropic",
            ProviderVariant::Google => "Google Gemini",
            ProviderVariant::Mistral => "Mistral AI",
            ProviderVariant::LocalAi => "LocalAI",
            ProviderVariant::Ollama => "Ollama",
        }
    }

    /// Default API base; `None` when the endpoint must be configured
    pub fn default_api_base(&self) -> Option<&'static str> {
        match self {
            ProviderVariant::OpenAi => Some("https://api.openai.com/v1/"),
            ProviderVariant::Anthropic => Some("https://api.anthropic.com/v1/"),
            ProviderVariant::Google => Some("https://generativelanguage.googleapis.com/v1beta/"),
            ProviderVariant::Mistral => Some("https://api.mistral.ai/v1/"),
            ProviderVariant::LocalAi => None,
            ProviderVariant::Ollama => Some("http://localhost:11434/v1/"),
        }
    }

    /// Environment variable consulted when no API key was configured
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderVariant::OpenAi => Some("OPENAI_API_KEY"),
            ProviderVariant::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderVariant::Google => Some("GEMINI_API_KEY"),
            ProviderVariant::Mistral => Some("MISTRAL_API_KEY"),
            ProviderVariant::LocalAi | ProviderVariant::Ollama => None,
        }
    }

    /// Whether this variant's builder applies `option` rather than dropping it
    ///
    /// An option is honored only when it reaches the wire. Seed goes through
    /// the OpenAI-compatible adapter; custom headers and the organization id
    /// travel as request headers.
    pub fn honors(&self, option: ModelOption) -> bool {
        use ModelOption::*;
        use ProviderVariant::*;

        match option {
            ModelName | Temperature | TopP | MaxRetries | Timeout | LogRequestsResponses => true,
            BaseUrl => !matches!(self, Google),
            ApiKey => matches!(self, OpenAi | Anthropic | Google | Mistral),
            CustomHeaders => matches!(self, OpenAi | Ollama),
            MaxOutputTokens => matches!(self, Google),
            MaxTokens => !matches!(self, Google),
            MaxCompletionTokens | OrganizationId => matches!(self, OpenAi),
            Seed => matches!(self, OpenAi | Mistral | Ollama),
            // genai has no request field for these
            TopK | PresencePenalty | FrequencyPenalty | RepeatPenalty | AllowCodeExecution
            | IncludeCodeExecutionOutput => false,
        }
    }

    /// Options this variant silently drops
    pub fn ignored_options(&self) -> Vec<ModelOption> {
        ModelOption::ALL
            .iter()
            .copied()
            .filter(|o| !self.honors(*o))
            .collect()
    }

    /// Fresh builder for this variant
    pub fn builder(&self) -> ProviderBuilder {
        ProviderBuilder::new(*self)
    }
}

impl std::fmt::Display for ProviderVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderVariant {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open_ai" => Ok(ProviderVariant::OpenAi),
            "anthropic" => Ok(ProviderVariant::Anthropic),
            "google" | "gemini" => Ok(ProviderVariant::Google),
            "mistral" => Ok(ProviderVariant::Mistral),
            "localai" | "local" => Ok(ProviderVariant::LocalAi),
            "ollama" => Ok(ProviderVariant::Ollama),
            other => Err(ConfigurationError::UnknownProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider() {
        assert_eq!("OpenAI".parse::<ProviderVariant>().unwrap(), ProviderVariant::OpenAi);
        assert_eq!("gemini".parse::<ProviderVariant>().unwrap(), ProviderVariant::Google);
        assert_eq!("local".parse::<ProviderVariant>().unwrap(), ProviderVariant::LocalAi);
        assert!(matches!(
            "bedrock".parse::<ProviderVariant>(),
            Err(ConfigurationError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_id_round_trips_through_from_str() {
        for provider in ProviderVariant::ALL {
            assert_eq!(provider.id().parse::<ProviderVariant>().unwrap(), provider);
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ProviderVariant::LocalAi).unwrap();
        assert_eq!(json, "\"localai\"");
        let google: ProviderVariant = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(google, ProviderVariant::Google);
    }

    #[test]
    fn test_capability_table() {
        assert!(ProviderVariant::OpenAi.honors(ModelOption::OrganizationId));
        assert!(ProviderVariant::Ollama.honors(ModelOption::Seed));
        assert!(!ProviderVariant::Anthropic.honors(ModelOption::Seed));
        assert!(!ProviderVariant::Google.honors(ModelOption::BaseUrl));
        assert!(!ProviderVariant::LocalAi.honors(ModelOption::ApiKey));

        for provider in ProviderVariant::ALL {
            assert!(provider.honors(ModelOption::ModelName));
            assert!(!provider.ignored_options().contains(&ModelOption::Temperature));
            for option in [
                ModelOption::TopK,
                ModelOption::PresencePenalty,
                ModelOption::FrequencyPenalty,
                ModelOption::RepeatPenalty,
                ModelOption::AllowCodeExecution,
                ModelOption::IncludeCodeExecutionOutput,
            ] {
                assert!(!provider.honors(option), "{provider} cannot send {option}");
            }
        }
    }

    #[test]
    fn test_only_local_ai_lacks_default_base() {
        for provider in ProviderVariant::ALL {
            let base = provider.default_api_base();
            assert_eq!(base.is_none(), provider == ProviderVariant::LocalAi);
            if let Some(base) = base {
                assert!(base.ends_with('/'));
            }
        }
    }
}
