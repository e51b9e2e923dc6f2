//! Anthropic Provider Implementation
//!
//! Implements the AIProvider trait against the messages API. Anthropic has no
//! JSON response mode; JSON-only output is requested through the system
//! prompt and the interpreter's fence extraction handles the rest.

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
// Anthropic Provider
// =============================================================================

/// Anthropic API provider
pub struct AnthropicProvider {
    api_key: String,
    #[allow(dead_code)]
    base_url: String,
    #[allow(dead_code)]
    default_model: String,
    #[cfg(feature = "ai-providers")]
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Default Anthropic API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com/v1";

    /// Default model
    pub const DEFAULT_MODEL: &'static str = "claude-3-5-haiku-latest";

    /// API version header value
    pub const API_VERSION: &'static str = "2023-06-01";

    /// Creates a new Anthropic provider
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
    fn build_request(&self, request: &CompletionRequest, model: &str) -> MessagesRequest {
        MessagesRequest {
            model: model.to_string(),
            max_tokens: request.max_tokens.unwrap_or(1024),
            system: request.system.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: request.temperature,
        }
    }
}

// =============================================================================
// Anthropic API Types
// =============================================================================

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

// =============================================================================
// AIProvider Implementation
// =============================================================================

#[async_trait]
impl AIProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[cfg(feature = "ai-providers")]
    async fn complete(&self, request: CompletionRequest) -> EditResult<CompletionResponse> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(self.default_model.as_str())
            .to_string();

        let api_request = self.build_request(&request, &model);
        let url = format!("{}/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", Self::API_VERSION)
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
                "Anthropic API error ({}): {}",
                status,
                body.chars().take(300).collect::<String>()
            )));
        }

        let api_response: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| EditError::AiRequestFailed(format!("Failed to parse response: {}", e)))?;

        let text = api_response
            .content
            .iter()
            .filter(|b| b.block_type == "text")
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        let finish_reason = match api_response.stop_reason.as_deref() {
            Some("max_tokens") => FinishReason::Length,
            _ => FinishReason::Stop,
        };

        let usage = api_response
            .usage
            .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens))
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
