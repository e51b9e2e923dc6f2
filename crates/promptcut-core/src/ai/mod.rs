//! AI Integration Module
//!
//! The external language-model boundary: the provider trait, concrete
//! provider implementations, and their configuration. The prompt interpreter
//! in [`crate::interpreter`] sits on top of this module.

pub mod provider;
pub mod providers;

pub use provider::{
    AIProvider, CompletionRequest, CompletionResponse, FinishReason, MockProvider, TokenUsage,
};
pub use providers::{
    create_provider, AnthropicProvider, GeminiProvider, OpenAIProvider, ProviderConfig,
    ProviderType,
};
