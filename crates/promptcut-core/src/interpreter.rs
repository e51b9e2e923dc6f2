//! Prompt Interpreter Module
//!
//! Single-shot mapping from a free-text instruction to a validated operation
//! descriptor. The interpreter renders the operation catalog and the current
//! video metadata into the system prompt, asks the provider for strict JSON,
//! and re-validates the reply field by field through
//! [`OperationDescriptor::from_ai_value`]. Service failures surface as a
//! distinct failure kind; they are never silently defaulted.

use std::sync::Arc;

use regex::Regex;
use tracing::{debug, warn};

use crate::ai::{AIProvider, CompletionRequest, CompletionResponse};
use crate::descriptor::OperationDescriptor;
use crate::error::{EditError, EditResult};
use crate::ffmpeg::MediaInfo;
use crate::registry;

// =============================================================================
// Configuration
// =============================================================================

/// Interpreter tuning knobs
#[derive(Clone, Debug)]
pub struct InterpreterConfig {
    /// Completion attempts before giving up
    pub max_retries: u32,
    /// Sampling temperature (low: this is a mapping task, not generation)
    pub temperature: f32,
    /// Token budget for the structured reply
    pub max_tokens: u32,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            temperature: 0.2,
            max_tokens: 512,
        }
    }
}

// =============================================================================
// Prompt Interpreter
// =============================================================================

/// Translates natural-language prompts into operation descriptors
pub struct PromptInterpreter {
    provider: Arc<dyn AIProvider>,
    config: InterpreterConfig,
}

impl PromptInterpreter {
    /// Creates an interpreter on top of a provider.
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            config: InterpreterConfig::default(),
        }
    }

    /// Overrides the default configuration.
    pub fn with_config(mut self, config: InterpreterConfig) -> Self {
        self.config = config;
        self
    }

    /// The provider name, for status display.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Interprets a free-text instruction against the current video.
    pub async fn interpret(
        &self,
        prompt: &str,
        media: &MediaInfo,
    ) -> EditResult<OperationDescriptor> {
        if prompt.trim().is_empty() {
            return Err(EditError::Unsupported("Empty prompt".to_string()));
        }

        let request = CompletionRequest::new(prompt)
            .with_system(&build_system_prompt(media))
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature)
            .with_json_mode();

        let response = self.complete_with_retry(request).await?;
        debug!(
            provider = self.provider.name(),
            model = %response.model,
            tokens = response.usage.total_tokens,
            "AI completion received"
        );

        parse_response(&response.text)
    }

    /// Completes a request with exponential-backoff retry.
    async fn complete_with_retry(
        &self,
        request: CompletionRequest,
    ) -> EditResult<CompletionResponse> {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            match self.provider.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(attempt, error = %e, "AI completion attempt failed");
                    last_error = Some(e);
                    if attempt + 1 < self.config.max_retries {
                        tokio::time::sleep(tokio::time::Duration::from_millis(
                            100 * (2_u64.pow(attempt)),
                        ))
                        .await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| EditError::AiRequestFailed("No attempts made".to_string())))
    }
}

// =============================================================================
// Prompt Construction
// =============================================================================

fn build_system_prompt(media: &MediaInfo) -> String {
    let resolution = media
        .resolution()
        .map(|(w, h)| format!("{}x{}", w, h))
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "You are a video editing assistant that translates a natural-language \
         instruction into exactly one structured JSON operation.\n\
         \n\
         Current video: duration {:.2} seconds, resolution {}, audio: {}.\n\
         \n\
         Supported operations (the \"action\" field selects one; all other \
         fields are that operation's parameters, using exactly these names):\n\
         {}\n\
         Rules:\n\
         - Output only a single JSON object, nothing else.\n\
         - Include only fields listed for the chosen action; omit parameters \
           you want defaulted.\n\
         - trim keeps the range [start_sec, end_sec); \"cut the first N \
           seconds\" therefore means start_sec = N with no end_sec.\n\
         - If the instruction does not match any supported operation, output \
           {{\"action\": \"unsupported\", \"reason\": \"<short explanation>\"}}.",
        media.duration_sec,
        resolution,
        if media.has_audio() { "yes" } else { "no" },
        registry::render_catalog(),
    )
}

// =============================================================================
// Response Parsing
// =============================================================================

/// Parses the provider's reply text into a validated descriptor.
fn parse_response(text: &str) -> EditResult<OperationDescriptor> {
    let json_str = extract_json(text);
    let json_str = strip_trailing_commas(json_str.trim());

    let value: serde_json::Value = serde_json::from_str(&json_str).map_err(|e| {
        EditError::AiResponseMalformed(format!(
            "{} (response: {})",
            e,
            text.chars().take(120).collect::<String>()
        ))
    })?;

    OperationDescriptor::from_ai_value(value)
}

/// Extracts the JSON payload from a possibly fenced reply.
fn extract_json(text: &str) -> &str {
    if text.contains("```json") {
        text.split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(text)
    } else if text.contains("```") {
        text.split("```")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(text)
    } else {
        text
    }
}

/// Removes trailing commas before `}` or `]`, a common LLM artifact.
fn strip_trailing_commas(json: &str) -> String {
    static TRAILING_COMMA: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let re = TRAILING_COMMA.get_or_init(|| {
        Regex::new(r",\s*([}\]])").unwrap_or_else(|e| unreachable!("invalid regex: {}", e))
    });
    re.replace_all(json, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockProvider;
    use crate::descriptor::{Operation, TrimParams};
    use crate::error::FailureClass;
    use crate::ffmpeg::{MediaInfo, VideoStreamInfo};

    fn media(duration_sec: f64) -> MediaInfo {
        MediaInfo {
            duration_sec,
            video: Some(VideoStreamInfo {
                width: 1920,
                height: 1080,
                fps: 30.0,
                codec: "h264".to_string(),
            }),
            audio: None,
            format: "mp4".to_string(),
            size_bytes: 0,
        }
    }

    fn interpreter(response: &str) -> PromptInterpreter {
        PromptInterpreter::new(Arc::new(
            MockProvider::new("mock").with_response(response),
        ))
    }

    #[test]
    fn test_system_prompt_carries_catalog_and_metadata() {
        let prompt = build_system_prompt(&media(20.0));
        assert!(prompt.contains("20.00 seconds"));
        assert!(prompt.contains("1920x1080"));
        assert!(prompt.contains("\"trim\""));
        assert!(prompt.contains("picture_in_picture"));
        assert!(prompt.contains("unsupported"));
    }

    #[test]
    fn test_extract_json_fenced() {
        let text = "Here you go:\n```json\n{\"action\":\"grayscale\"}\n```\nDone.";
        assert_eq!(extract_json(text).trim(), "{\"action\":\"grayscale\"}");

        let text = "```\n{\"action\":\"grayscale\"}\n```";
        assert_eq!(extract_json(text).trim(), "{\"action\":\"grayscale\"}");

        assert_eq!(extract_json("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_strip_trailing_commas() {
        assert_eq!(
            strip_trailing_commas("{\"a\": 1, \"b\": [1, 2,], }"),
            "{\"a\": 1, \"b\": [1, 2]}"
        );
    }

    #[tokio::test]
    async fn test_cut_first_five_seconds_scenario() {
        // "cut the first 5 seconds" on a 20s video: trim keeps [5, end),
        // so the result is 15s of video.
        let interpreter = interpreter("```json\n{\"action\": \"trim\", \"start_sec\": 5.0,}\n```");
        let descriptor = interpreter
            .interpret("cut the first 5 seconds", &media(20.0))
            .await
            .unwrap();

        assert_eq!(
            descriptor.op,
            Operation::Trim(TrimParams {
                start_sec: 5.0,
                end_sec: None
            })
        );
        assert!(descriptor.validated);
    }

    #[tokio::test]
    async fn test_unsupported_action_is_interpretation_failure() {
        let interpreter = interpreter(
            "{\"action\": \"unsupported\", \"reason\": \"audio translation is not supported\"}",
        );
        let err = interpreter
            .interpret("translate the audio to French", &media(20.0))
            .await
            .unwrap_err();
        assert_eq!(err.class(), FailureClass::Interpretation);
        assert!(err.to_string().contains("translation"));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_interpretation_failure() {
        let interpreter = interpreter("sure, trimming the video now!");
        let err = interpreter
            .interpret("trim it", &media(20.0))
            .await
            .unwrap_err();
        assert!(matches!(err, EditError::AiResponseMalformed(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_reply_is_validation_failure() {
        let interpreter =
            interpreter("{\"action\": \"add_text\", \"text\": \"hi\", \"position\": \"150%,50%\"}");
        let err = interpreter
            .interpret("caption it", &media(20.0))
            .await
            .unwrap_err();
        assert_eq!(err.class(), FailureClass::Validation);
    }

    #[tokio::test]
    async fn test_provider_failure_is_distinct() {
        let provider = Arc::new(MockProvider::new("down").with_available(false));
        let interpreter = PromptInterpreter::new(provider).with_config(InterpreterConfig {
            max_retries: 1,
            ..Default::default()
        });
        let err = interpreter
            .interpret("trim it", &media(20.0))
            .await
            .unwrap_err();
        assert!(matches!(err, EditError::AiRequestFailed(_)));
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let provider = Arc::new(
            MockProvider::new("flaky")
                .with_response("{\"action\": \"grayscale\"}")
                .failing_first(2),
        );
        let interpreter = PromptInterpreter::new(provider);
        let descriptor = interpreter
            .interpret("make it black and white", &media(20.0))
            .await
            .unwrap();
        assert_eq!(descriptor.op, Operation::Grayscale);
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected() {
        let interpreter = interpreter("{\"action\": \"grayscale\"}");
        assert!(interpreter.interpret("   ", &media(20.0)).await.is_err());
    }
}
