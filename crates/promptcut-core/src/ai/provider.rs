//! AI Provider Module
//!
//! Defines the trait and types for the external language-model boundary.
//! Providers are treated as untrusted: everything they return is re-validated
//! by the prompt interpreter before use.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};

// =============================================================================
// AI Provider Trait
// =============================================================================

/// Trait for AI providers (Gemini, OpenAI, Anthropic, mocks)
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Returns the provider name
    fn name(&self) -> &str;

    /// Generates a completion from a prompt
    async fn complete(&self, request: CompletionRequest) -> EditResult<CompletionResponse>;

    /// Checks if the provider is available
    fn is_available(&self) -> bool;
}

// =============================================================================
// Completion Request
// =============================================================================

/// Request for text completion
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    /// System prompt/instructions
    pub system: Option<String>,
    /// User prompt
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Model to use (provider-specific)
    pub model: Option<String>,
    /// Whether to request strict JSON output
    pub json_mode: bool,
}

impl CompletionRequest {
    /// Creates a new completion request
    pub fn new(prompt: &str) -> Self {
        Self {
            system: None,
            prompt: prompt.to_string(),
            max_tokens: None,
            temperature: None,
            model: None,
            json_mode: false,
        }
    }

    /// Sets the system prompt
    pub fn with_system(mut self, system: &str) -> Self {
        self.system = Some(system.to_string());
        self
    }

    /// Sets the maximum tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the model
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// Enables JSON mode
    pub fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

// =============================================================================
// Completion Response
// =============================================================================

/// Response from text completion
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    /// Generated text
    pub text: String,
    /// Model used
    pub model: String,
    /// Token usage
    pub usage: TokenUsage,
    /// Finish reason
    pub finish_reason: FinishReason,
}

impl CompletionResponse {
    /// Creates a new completion response
    pub fn new(text: &str, model: &str) -> Self {
        Self {
            text: text.to_string(),
            model: model.to_string(),
            usage: TokenUsage::default(),
            finish_reason: FinishReason::Stop,
        }
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Completion tokens
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Creates a new token usage record
    pub fn new(prompt: u32, completion: u32) -> Self {
        Self {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: prompt + completion,
        }
    }
}

/// Reason for completion finish
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Normal stop
    #[default]
    Stop,
    /// Reached max tokens
    Length,
    /// Content filter triggered
    ContentFilter,
}

// =============================================================================
// Mock Provider (for testing and offline demos)
// =============================================================================

/// Mock AI provider with a canned response
pub struct MockProvider {
    name: String,
    response: String,
    available: bool,
    fail_attempts: std::sync::atomic::AtomicU32,
}

impl MockProvider {
    /// Creates a new mock provider
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            response: "{\"action\": \"unsupported\", \"reason\": \"mock provider\"}".to_string(),
            available: true,
            fail_attempts: std::sync::atomic::AtomicU32::new(0),
        }
    }

    /// Sets the canned response text
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Sets availability
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Fails the first `n` completion calls with a request error, then
    /// succeeds (for retry tests).
    pub fn failing_first(mut self, n: u32) -> Self {
        self.fail_attempts = std::sync::atomic::AtomicU32::new(n);
        self
    }
}

#[async_trait]
impl AIProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, _request: CompletionRequest) -> EditResult<CompletionResponse> {
        if !self.available {
            return Err(EditError::AiRequestFailed(
                "Provider not available".to_string(),
            ));
        }

        let remaining = self
            .fail_attempts
            .load(std::sync::atomic::Ordering::SeqCst);
        if remaining > 0 {
            self.fail_attempts
                .store(remaining - 1, std::sync::atomic::Ordering::SeqCst);
            return Err(EditError::AiRequestFailed(
                "Transient mock failure".to_string(),
            ));
        }

        Ok(CompletionResponse {
            text: self.response.clone(),
            model: "mock-model".to_string(),
            usage: TokenUsage::new(10, 20),
            finish_reason: FinishReason::Stop,
        })
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new("Hello")
            .with_system("You are a video editing assistant")
            .with_max_tokens(100)
            .with_temperature(0.2)
            .with_model("gemini-2.5-flash")
            .with_json_mode();

        assert_eq!(request.prompt, "Hello");
        assert_eq!(
            request.system,
            Some("You are a video editing assistant".to_string())
        );
        assert_eq!(request.max_tokens, Some(100));
        assert_eq!(request.temperature, Some(0.2));
        assert!(request.json_mode);
    }

    #[test]
    fn test_token_usage() {
        let usage = TokenUsage::new(100, 50);
        assert_eq!(usage.total_tokens, 150);
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockProvider::new("test").with_response("{\"action\":\"mute_audio\"}");

        assert_eq!(provider.name(), "test");
        assert!(provider.is_available());

        let response = provider
            .complete(CompletionRequest::new("mute it"))
            .await
            .unwrap();
        assert!(response.text.contains("mute_audio"));
    }

    #[tokio::test]
    async fn test_mock_provider_unavailable() {
        let provider = MockProvider::new("test").with_available(false);

        let result = provider.complete(CompletionRequest::new("hi")).await;
        assert!(matches!(result, Err(EditError::AiRequestFailed(_))));
    }

    #[tokio::test]
    async fn test_mock_provider_transient_failures() {
        let provider = MockProvider::new("test")
            .with_response("{\"action\":\"grayscale\"}")
            .failing_first(2);

        assert!(provider.complete(CompletionRequest::new("x")).await.is_err());
        assert!(provider.complete(CompletionRequest::new("x")).await.is_err());
        assert!(provider.complete(CompletionRequest::new("x")).await.is_ok());
    }
}
