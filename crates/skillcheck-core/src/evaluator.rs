//! Evaluator client.
//!
//! Wraps "send transcript, get text back" against a provider. One provider
//! call per invocation, no retries. Empty output becomes
//! [`EMPTY_RESPONSE_PLACEHOLDER`] so the quiz never stalls on a blank reply.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::model::Message;
use crate::prompts::EMPTY_RESPONSE_PLACEHOLDER;
use crate::traits::{GenerateRequest, LlmProvider};

/// The seam the state machine calls through.
#[async_trait]
pub trait Evaluate: Send + Sync {
    /// Turn a role-tagged transcript into a text reply. Never returns an empty string.
    async fn evaluate(&self, messages: &[Message]) -> anyhow::Result<String>;
}

/// Settings for the evaluator.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Max tokens per reply.
    pub max_tokens: u32,
    /// Sampling temperature; `None` leaves the provider default.
    pub temperature: Option<f64>,
    /// Map provider failures to the placeholder instead of propagating them.
    pub recover_errors: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".into(),
            max_tokens: 1024,
            temperature: None,
            recover_errors: false,
        }
    }
}

/// Stateless evaluator over an [`LlmProvider`].
pub struct Evaluator {
    provider: Arc<dyn LlmProvider>,
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(provider: Arc<dyn LlmProvider>, config: EvaluatorConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

/// Substitute the placeholder for blank model output.
pub fn non_empty_or_placeholder(text: String) -> String {
    if text.trim().is_empty() {
        EMPTY_RESPONSE_PLACEHOLDER.to_string()
    } else {
        text
    }
}

#[async_trait]
impl Evaluate for Evaluator {
    async fn evaluate(&self, messages: &[Message]) -> anyhow::Result<String> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            messages: messages.to_vec(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        match self.provider.generate(&request).await {
            Ok(response) => {
                tracing::debug!(
                    provider = self.provider.name(),
                    model = %response.model,
                    latency_ms = response.latency_ms,
                    tokens = response.token_usage.total_tokens,
                    "evaluator replied"
                );
                if response.content.trim().is_empty() {
                    tracing::warn!(provider = self.provider.name(), "empty model output");
                }
                Ok(non_empty_or_placeholder(response.content))
            }
            Err(e) if self.config.recover_errors => {
                let kind = e
                    .downcast_ref::<ProviderError>()
                    .map(ProviderError::kind)
                    .unwrap_or("unknown");
                tracing::warn!(
                    provider = self.provider.name(),
                    kind,
                    "evaluator call failed, substituting placeholder: {e:#}"
                );
                Ok(EMPTY_RESPONSE_PLACEHOLDER.to_string())
            }
            Err(e) => {
                let hint = if e
                    .downcast_ref::<ProviderError>()
                    .is_some_and(ProviderError::is_credential_failure)
                {
                    " (check the API key)"
                } else {
                    ""
                };
                Err(e.context(format!(
                    "evaluator call to provider '{}' failed{hint}",
                    self.provider.name()
                )))
            }
        }
    }
}
