//! Static catalog of known hosted models with pricing
//!
//! Prices are USD per million tokens. Self-hosted variants (LocalAI, Ollama)
//! have no entries; their model names come from configuration.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::builder::ProviderVariant;

/// Model used when nothing else was configured
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// One catalog row
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub provider: ProviderVariant,
    pub name: &'static str,
    pub description: &'static str,
    pub input_price: f64,
    pub output_price: f64,
}

impl CatalogEntry {
    const fn new(
        provider: ProviderVariant,
        name: &'static str,
        description: &'static str,
        input_price: f64,
        output_price: f64,
    ) -> Self {
        Self {
            provider,
            name,
            description,
            input_price,
            output_price,
        }
    }

    /// Cost in USD for a request of the given size
    pub fn estimate_cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 * self.input_price + output_tokens as f64 * self.output_price)
            / 1_000_000.0
    }
}

impl std::fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) ${:.3}/${:.3} per 1M tokens",
            self.name,
            self.provider.display_name(),
            self.input_price,
            self.output_price
        )
    }
}

use ProviderVariant::{Anthropic, Google, Mistral, OpenAi};

static ENTRIES: &[CatalogEntry] = &[
    CatalogEntry::new(Google, "gemini-1.5-flash", "A fast and cost-effective model for rapid assessments.", 0.075, 0.30),
    CatalogEntry::new(Google, "gemini-1.5-pro", "Gemini with enhanced reasoning for larger contexts.", 1.25, 5.00),
    CatalogEntry::new(OpenAi, "gpt-4o-mini", "Good balance of performance and cost.", 0.150, 0.600),
    CatalogEntry::new(OpenAi, "o1-mini", "Compact reasoning model.", 3.00, 12.00),
    CatalogEntry::new(OpenAi, "chatgpt-4o-latest", "Latest ChatGPT model.", 5.00, 15.00),
    CatalogEntry::new(OpenAi, "gpt-4o", "Premium choice for complex tasks.", 2.50, 10.00),
    CatalogEntry::new(Anthropic, "claude-3-5-sonnet-20240620", "Sonnet with refined conversational capabilities.", 3.00, 15.00),
    CatalogEntry::new(Anthropic, "claude-3-haiku-20240307", "Small, fast Claude model.", 0.25, 1.25),
    CatalogEntry::new(Mistral, "open-codestral-mamba", "Open-source Mamba 2 model.", 0.0, 0.0),
    CatalogEntry::new(Mistral, "pixtral-12b", "Vision-capable small model.", 0.15, 0.15),
    CatalogEntry::new(Mistral, "mistral-nemo", "Mistral model trained for code tasks.", 0.15, 0.15),
    CatalogEntry::new(Mistral, "pixtral-12b-2409", "12B model with image understanding.", 0.0, 0.0),
    CatalogEntry::new(Mistral, "open-mistral-nemo", "Multilingual open-source model.", 0.0, 0.0),
    CatalogEntry::new(Mistral, "mistral-large-latest", "Top-tier reasoning for complex tasks.", 2.00, 6.00),
    CatalogEntry::new(Mistral, "mistral-small-latest", "Cost-efficient and fast.", 0.20, 0.60),
    CatalogEntry::new(Mistral, "codestral-latest", "Mistral model trained for code tasks.", 0.20, 0.60),
    CatalogEntry::new(Mistral, "mistral-embed", "Semantic embedding model.", 0.10, 0.00),
    CatalogEntry::new(Mistral, "ministral-3b-latest", "Most efficient edge model.", 0.04, 0.04),
    CatalogEntry::new(Mistral, "ministral-8b-latest", "Model for on-device use cases.", 0.10, 0.10),
];

static BY_NAME: Lazy<HashMap<&'static str, &'static CatalogEntry>> =
    Lazy::new(|| ENTRIES.iter().map(|e| (e.name, e)).collect());

/// Exact-match lookup by model id
pub fn find_by_name(name: &str) -> Option<&'static CatalogEntry> {
    BY_NAME.get(name).copied()
}

/// All entries, in catalog order
pub fn entries() -> &'static [CatalogEntry] {
    ENTRIES
}

/// Entries served by `provider`, in catalog order
pub fn models_for(provider: ProviderVariant) -> impl Iterator<Item = &'static CatalogEntry> {
    ENTRIES.iter().filter(move |e| e.provider == provider)
}

/// Entry for `DEFAULT_MODEL`
pub fn default_model() -> Option<&'static CatalogEntry> {
    find_by_name(DEFAULT_MODEL)
}

/// Model a hosted variant falls back to when none was configured
pub fn default_model_for(provider: ProviderVariant) -> Option<&'static str> {
    match provider {
        ProviderVariant::OpenAi => Some(DEFAULT_MODEL),
        ProviderVariant::Anthropic => Some("claude-3-haiku-20240307"),
        ProviderVariant::Google => Some("gemini-1.5-flash"),
        ProviderVariant::Mistral => Some("mistral-small-latest"),
        ProviderVariant::LocalAi | ProviderVariant::Ollama => None,
    }
}
