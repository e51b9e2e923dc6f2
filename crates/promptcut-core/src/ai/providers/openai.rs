//! OpenAI Provider Implementation
//!
//! Implements the AIProvider trait against the chat completions API.

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
// OpenAI Provider
// =============================================================================

/// OpenAI API provider
pub struct OpenAIProvider {
    api_key: String,
    #[allow(dead_code)]
    base_url: String,
    #[allow(dead_code)]
    default_model: String,
    #[cfg(feature = "ai-providers")]
    client: reqwest::Client,
}

impl OpenAIProvider {
    /// Default OpenAI API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Default model
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    /// Creates a new OpenAI provider
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
    fn build_request(&self, request: &CompletionRequest, model: &str) -> ChatCompletionRequest {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatCompletionRequest {
            model: model.to_string(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: if request.json_mode {
                Some(ResponseFormat {
                    format_type: "json_object".to_string(),
                })
            } else {
                None
            },
        }
    }
}

// =============================================================================
// OpenAI API Types
// =============================================================================

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

// =============================================================================
// AIProvider Implementation
// =============================================================================

#[async_trait]
impl AIProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    #[cfg(feature = "ai-providers")]
    async fn complete(&self, request: CompletionRequest) -> EditResult<CompletionResponse> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(self.default_model.as_str())
            .to_string();

        let api_request = self.build_request(&request, &model);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
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
                "OpenAI API error ({}): {}",
                status,
                body.chars().take(300).collect::<String>()
            )));
        }

        let api_response: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| EditError::AiRequestFailed(format!("Failed to parse response: {}", e)))?;

        let choice = api_response.choices.into_iter().next().ok_or_else(|| {
            EditError::AiRequestFailed("No choices returned from OpenAI".to_string())
        })?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        let usage = api_response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            text: choice.message.content,
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

    #[test]
    fn test_build_request_places_system_first() {
        let provider = OpenAIProvider::new(ProviderConfig::openai("test-key")).unwrap();
        let request = CompletionRequest::new("mute the audio")
            .with_system("catalog")
            .with_json_mode();

        let api_request = provider.build_request(&request, "gpt-4o-mini");
        assert_eq!(api_request.messages.len(), 2);
        assert_eq!(api_request.messages[0].role, "system");
        assert_eq!(api_request.messages[1].role, "user");
        assert!(api_request.response_format.is_some());
    }
}
