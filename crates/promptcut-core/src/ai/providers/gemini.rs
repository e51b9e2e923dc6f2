//! Google Gemini Provider Implementation
//!
//! Implements the AIProvider trait for Google's Gemini models. Gemini is the
//! primary provider: it supports a JSON response MIME type, which keeps the
//! interpreter's strict decoding honest.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{require_api_key, ProviderConfig};
use crate::ai::provider::{AIProvider, CompletionRequest, CompletionResponse};
#[cfg(feature = "ai-providers")]
use crate::ai::provider::{FinishReason, TokenUsage};
use crate::error::EditResult;
#[cfg(feature = "ai-providers")]
use crate::error::EditError;

// =============================================================================
// Gemini Provider
// =============================================================================

/// Google Gemini API provider
pub struct GeminiProvider {
    /// API key
    api_key: String,
    /// Base URL for API requests
    #[allow(dead_code)]
    base_url: String,
    /// Default model
    #[allow(dead_code)]
    default_model: String,
    /// HTTP client
    #[cfg(feature = "ai-providers")]
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Default Gemini API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    /// Default model
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";

    /// Creates a new Gemini provider
    pub fn new(config: ProviderConfig) -> EditResult<Self> {
        let api_key = require_api_key(&config)?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());
        let default_model = config
            .model
            .unwrap_or_else(|| Self::DEFAULT_MODEL.to_string());

        #[cfg(feature = "ai-providers")]
        let client = {
            let timeout_secs = config.timeout_secs.unwrap_or(60);
            reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .map_err(|e| {
                    EditError::Internal(format!("Failed to create HTTP client: {}", e))
                })?
        };

        Ok(Self {
            api_key,
            base_url,
            default_model,
            #[cfg(feature = "ai-providers")]
            client,
        })
    }

    #[allow(dead_code)]
    fn build_request(&self, request: &CompletionRequest) -> GenerateContentRequest {
        let system_instruction = request.system.as_ref().map(|system| Content {
            role: None,
            parts: vec![Part {
                text: system.clone(),
            }],
        });

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            system_instruction,
            generation_config: Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                response_mime_type: if request.json_mode {
                    Some("application/json".to_string())
                } else {
                    None
                },
            }),
        }
    }
}

// =============================================================================
// Gemini API Types
// =============================================================================

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

// =============================================================================
// AIProvider Implementation
// =============================================================================

#[async_trait]
impl AIProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[cfg(feature = "ai-providers")]
    async fn complete(&self, request: CompletionRequest) -> EditResult<CompletionResponse> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(self.default_model.as_str())
            .to_string();

        let api_request = self.build_request(&request);

        // API key goes in a header so it never shows up in logged URLs.
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| EditError::AiRequestFailed(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EditError::AiRequestFailed(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(EditError::AiRequestFailed(format!(
                "Gemini API error ({}): {}",
                status,
                body.chars().take(300).collect::<String>()
            )));
        }

        let api_response: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| EditError::AiRequestFailed(format!("Failed to parse response: {}", e)))?;

        if let Some(feedback) = &api_response.prompt_feedback {
            if let Some(reason) = &feedback.block_reason {
                return Err(EditError::AiRequestFailed(format!(
                    "Content blocked by Gemini safety filters: {}",
                    reason
                )));
            }
        }

        let candidates = api_response.candidates.ok_or_else(|| {
            EditError::AiRequestFailed("No candidates returned from Gemini".to_string())
        })?;
        let candidate = candidates.first().ok_or_else(|| {
            EditError::AiRequestFailed("Empty candidates array from Gemini".to_string())
        })?;

        let text = candidate
            .content
            .as_ref()
            .and_then(|c| c.parts.first())
            .map(|p| p.text.clone())
            .unwrap_or_default();

        let finish_reason = match candidate.finish_reason.as_deref() {
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("RECITATION") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        let usage = api_response
            .usage_metadata
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count.unwrap_or(0),
                completion_tokens: u.candidates_token_count.unwrap_or(0),
                total_tokens: u.total_token_count.unwrap_or(0),
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            text,
            model,
            usage,
            finish_reason,
        })
    }

    #[cfg(not(feature = "ai-providers"))]
    async fn complete(&self, _request: CompletionRequest) -> EditResult<CompletionResponse> {
        Err(crate::error::EditError::NotSupported(
            "AI providers feature not enabled. Build with --features ai-providers".to_string(),
        ))
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(ProviderConfig::gemini("test-key")).unwrap()
    }

    #[test]
    fn test_requires_api_key() {
        let config = ProviderConfig {
            provider_type: super::super::ProviderType::Gemini,
            api_key: Some(String::new()),
            base_url: None,
            model: None,
            timeout_secs: None,
        };
        assert!(GeminiProvider::new(config).is_err());
    }

    #[test]
    fn test_build_request_json_mode() {
        let request = CompletionRequest::new("trim the first 5 seconds")
            .with_system("catalog goes here")
            .with_temperature(0.2)
            .with_json_mode();

        let api_request = provider().build_request(&request);
        assert_eq!(api_request.contents.len(), 1);
        assert!(api_request.system_instruction.is_some());

        let config = api_request.generation_config.unwrap();
        assert_eq!(config.response_mime_type.as_deref(), Some("application/json"));
        assert_eq!(config.temperature, Some(0.2));
    }
}
