//! Core trait definitions for LLM providers.
//!
//! The async `LlmProvider` trait is implemented by the `skillcheck-providers`
//! crate; the evaluator in this crate only sees the trait object.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::Message;

/// Trait for LLM backends that turn a message list into text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate a reply for the given messages.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// List available models for this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request sent to a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gemini-2.5-flash").
    pub model: String,
    /// Role-tagged transcript, in order.
    pub messages: Vec<Message>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature; `None` leaves the provider default.
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// Response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw text output. May be empty.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
}
