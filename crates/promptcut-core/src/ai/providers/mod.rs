//! AI Provider Implementations
//!
//! Concrete implementations of the AIProvider trait for the supported AI
//! services, plus the configuration and factory that select one.

mod anthropic;
mod gemini;
mod openai;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::provider::AIProvider;
use crate::error::{EditError, EditResult};

// =============================================================================
// Provider Configuration
// =============================================================================

/// Supported AI provider types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// Google Gemini models (the default)
    Gemini,
    /// OpenAI GPT models
    OpenAI,
    /// Anthropic Claude models
    Anthropic,
}

impl ProviderType {
    /// Conventional environment variable carrying this provider's API key.
    pub fn conventional_key_env(&self) -> &'static str {
        match self {
            ProviderType::Gemini => "GEMINI_API_KEY",
            ProviderType::OpenAI => "OPENAI_API_KEY",
            ProviderType::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderType::Gemini => write!(f, "gemini"),
            ProviderType::OpenAI => write!(f, "openai"),
            ProviderType::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl std::str::FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderType::Gemini),
            "openai" => Ok(ProviderType::OpenAI),
            "anthropic" | "claude" => Ok(ProviderType::Anthropic),
            _ => Err(format!("Unknown provider type: {}", s)),
        }
    }
}

/// Configuration for creating a provider
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Provider type
    pub provider_type: ProviderType,
    /// API key
    pub api_key: Option<String>,
    /// Base URL (for custom endpoints)
    pub base_url: Option<String>,
    /// Default model to use
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    /// Creates a new Google Gemini provider config
    pub fn gemini(api_key: &str) -> Self {
        Self {
            provider_type: ProviderType::Gemini,
            api_key: Some(api_key.to_string()),
            base_url: None,
            model: None,
            timeout_secs: Some(60),
        }
    }

    /// Creates a new OpenAI provider config
    pub fn openai(api_key: &str) -> Self {
        Self {
            provider_type: ProviderType::OpenAI,
            api_key: Some(api_key.to_string()),
            base_url: None,
            model: None,
            timeout_secs: Some(60),
        }
    }

    /// Creates a new Anthropic provider config
    pub fn anthropic(api_key: &str) -> Self {
        Self {
            provider_type: ProviderType::Anthropic,
            api_key: Some(api_key.to_string()),
            base_url: None,
            model: None,
            timeout_secs: Some(60),
        }
    }

    /// Overrides the model
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }
}

/// Creates a provider instance from a configuration.
pub fn create_provider(config: ProviderConfig) -> EditResult<Arc<dyn AIProvider>> {
    match config.provider_type {
        ProviderType::Gemini => Ok(Arc::new(GeminiProvider::new(config)?)),
        ProviderType::OpenAI => Ok(Arc::new(OpenAIProvider::new(config)?)),
        ProviderType::Anthropic => Ok(Arc::new(AnthropicProvider::new(config)?)),
    }
}

/// Pulls the API key out of the config or returns a config error that names
/// the provider.
pub(crate) fn require_api_key(config: &ProviderConfig) -> EditResult<String> {
    match &config.api_key {
        Some(key) if !key.is_empty() => Ok(key.clone()),
        _ => Err(EditError::Config(format!(
            "{} API key is required (set {})",
            config.provider_type,
            config.provider_type.conventional_key_env()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_provider_type_from_str() {
        assert_eq!(ProviderType::from_str("gemini").unwrap(), ProviderType::Gemini);
        assert_eq!(ProviderType::from_str("OpenAI").unwrap(), ProviderType::OpenAI);
        assert_eq!(
            ProviderType::from_str("claude").unwrap(),
            ProviderType::Anthropic
        );
        assert!(ProviderType::from_str("llama").is_err());
    }

    #[test]
    fn test_create_provider_requires_api_key() {
        let config = ProviderConfig {
            provider_type: ProviderType::Gemini,
            api_key: None,
            base_url: None,
            model: None,
            timeout_secs: None,
        };
        let err = match create_provider(config) {
            Ok(_) => panic!("provider built without an API key"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_factory_builds_each_provider() {
        for (config, name) in [
            (ProviderConfig::gemini("k"), "gemini"),
            (ProviderConfig::openai("k"), "openai"),
            (ProviderConfig::anthropic("k"), "anthropic"),
        ] {
            let provider = create_provider(config).unwrap();
            assert_eq!(provider.name(), name);
        }
    }
}
