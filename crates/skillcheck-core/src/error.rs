//! Provider error types.
//!
//! These error types represent failures when talking to the model endpoint.
//! Defined in `skillcheck-core` so the evaluator can downcast and classify
//! failures without string matching.

use thiserror::Error;

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (missing or invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if the failure stems from the credential and retrying
    /// with the same configuration cannot succeed.
    pub fn is_credential_failure(&self) -> bool {
        matches!(self, ProviderError::AuthenticationFailed(_))
    }

    /// Short classification label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::RateLimited { .. } => "rate_limited",
            ProviderError::AuthenticationFailed(_) => "invalid_credential",
            ProviderError::ModelNotFound(_) => "model_not_found",
            ProviderError::ApiError { .. } => "api_error",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::NetworkError(_) => "transport",
        }
    }
}
