//! Settings Module
//!
//! Persistent configuration loaded from the platform config directory with
//! environment variable overrides. The API key itself is resolved at startup
//! and never written back to disk.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ai::{ProviderConfig, ProviderType};
use crate::error::{EditError, EditResult};
use crate::history::DEFAULT_HISTORY_CAP;

const CONFIG_DIR_NAME: &str = "promptcut";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Environment override for the active provider
pub const PROVIDER_ENV: &str = "PROMPTCUT_PROVIDER";
/// Environment override for the model name
pub const MODEL_ENV: &str = "PROMPTCUT_MODEL";
/// Provider-agnostic API key; takes precedence over the provider's own
/// conventional variable
pub const API_KEY_ENV: &str = "PROMPTCUT_API_KEY";
/// Environment override for the undo history cap
pub const HISTORY_CAP_ENV: &str = "PROMPTCUT_HISTORY_CAP";

// =============================================================================
// Settings
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Which AI provider interprets prompts
    pub provider: ProviderType,
    /// Model override; `None` uses the provider's default
    pub model: Option<String>,
    /// Maximum retained edits before the oldest history entry is dropped
    pub history_cap: usize,
    /// Maximum AI request attempts per prompt
    pub max_retries: u32,
    /// Sampling temperature for interpretation requests
    pub temperature: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: ProviderType::Gemini,
            model: None,
            history_cap: DEFAULT_HISTORY_CAP,
            max_retries: 3,
            temperature: 0.2,
        }
    }
}

impl Settings {
    /// Reads settings from disk (missing file means defaults), then applies
    /// environment overrides.
    pub fn load() -> EditResult<Self> {
        let mut settings = match Self::config_path() {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(&path)?;
                debug!(path = %path.display(), "Loaded settings");
                serde_json::from_str(&raw)
                    .map_err(|e| EditError::Config(format!("Invalid settings file: {}", e)))?
            }
            _ => Self::default(),
        };
        settings.apply_env_overrides()?;
        Ok(settings)
    }

    /// Writes the settings file, creating the config directory if needed.
    pub fn save(&self) -> EditResult<()> {
        let path = Self::config_path()
            .ok_or_else(|| EditError::Config("No config directory available".to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, raw)?;
        debug!(path = %path.display(), "Saved settings");
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    fn apply_env_overrides(&mut self) -> EditResult<()> {
        if let Ok(provider) = std::env::var(PROVIDER_ENV) {
            self.provider = provider
                .parse()
                .map_err(|e: String| EditError::Config(e))?;
        }
        if let Ok(model) = std::env::var(MODEL_ENV) {
            if !model.trim().is_empty() {
                self.model = Some(model);
            }
        }
        if let Ok(cap) = std::env::var(HISTORY_CAP_ENV) {
            match cap.parse::<usize>() {
                Ok(n) if n > 0 => self.history_cap = n,
                _ => warn!(value = %cap, "Ignoring invalid {}", HISTORY_CAP_ENV),
            }
        }
        Ok(())
    }

    /// Resolves the API key: the provider-agnostic variable wins, then the
    /// provider's conventional variable. A missing key is a startup error,
    /// not a silent degradation.
    pub fn resolve_api_key(&self) -> EditResult<String> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }
        let conventional = self.provider.conventional_key_env();
        if let Ok(key) = std::env::var(conventional) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }
        Err(EditError::Config(format!(
            "No API key for {}: set {} or {}",
            self.provider, API_KEY_ENV, conventional
        )))
    }

    /// Builds the provider configuration used to create the AI client.
    pub fn provider_config(&self) -> EditResult<ProviderConfig> {
        let api_key = self.resolve_api_key()?;
        let mut config = match self.provider {
            ProviderType::Gemini => ProviderConfig::gemini(&api_key),
            ProviderType::OpenAI => ProviderConfig::openai(&api_key),
            ProviderType::Anthropic => ProviderConfig::anthropic(&api_key),
        };
        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.provider, ProviderType::Gemini);
        assert!(settings.model.is_none());
        assert_eq!(settings.history_cap, DEFAULT_HISTORY_CAP);
        assert_eq!(settings.max_retries, 3);
    }

    #[test]
    fn test_settings_round_trip() {
        let mut settings = Settings::default();
        settings.provider = ProviderType::Anthropic;
        settings.model = Some("claude-3-5-haiku-latest".to_string());
        settings.history_cap = 10;

        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("historyCap"));
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.provider, ProviderType::Anthropic);
        assert_eq!(back.history_cap, 10);
    }

    #[test]
    fn test_unknown_fields_in_file_are_tolerated() {
        let raw = r#"{"provider": "openai", "futureKnob": true}"#;
        let settings: Settings = serde_json::from_str(raw).unwrap();
        assert_eq!(settings.provider, ProviderType::OpenAI);
        assert_eq!(settings.history_cap, DEFAULT_HISTORY_CAP);
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let settings = Settings {
            provider: ProviderType::Gemini,
            ..Settings::default()
        };
        // Only meaningful when neither variable is set in the test
        // environment.
        if std::env::var(API_KEY_ENV).is_err()
            && std::env::var(settings.provider.conventional_key_env()).is_err()
        {
            let err = settings.resolve_api_key().unwrap_err();
            assert!(matches!(err, EditError::Config(_)));
        }
    }
}
