//! Google Gemini `generateContent` provider.

use std::time::Instant;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use skillcheck_core::error::ProviderError;
use skillcheck_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage,
};

use crate::contents::{to_gemini_contents, Content};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default model for evaluation calls.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini API provider.
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// The key is not checked here; a bad or missing key surfaces on the first call.
    pub fn new(api_key: &str, base_url: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: GeminiUsage,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate; empty when there is none.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();

        let body = GeminiRequest {
            contents: to_gemini_contents(&request.messages),
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        };

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(error_message(body)).into());
        }
        if status == 404 {
            return Err(ProviderError::ModelNotFound(request.model.clone()).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            // Gemini reports a bad key as 400 INVALID_ARGUMENT.
            if body.contains("API_KEY_INVALID") {
                return Err(ProviderError::AuthenticationFailed(error_message(body)).into());
            }
            let message = error_message(body);
            return Err(ProviderError::ApiError { status, message }.into());
        }

        let api_response: GeminiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let content = api_response.text();
        let usage = &api_response.usage_metadata;

        Ok(GenerateResponse {
            content,
            model: api_response
                .model_version
                .clone()
                .unwrap_or_else(|| request.model.clone()),
            token_usage: TokenUsage {
                prompt_tokens: usage.prompt_token_count,
                completion_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            },
            latency_ms,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: DEFAULT_MODEL.into(),
                name: "Gemini 2.5 Flash".into(),
                provider: "gemini".into(),
                max_context: 1_048_576,
            },
            ModelInfo {
                id: "gemini-2.5-pro".into(),
                name: "Gemini 2.5 Pro".into(),
                provider: "gemini".into(),
                max_context: 1_048_576,
            },
        ]
    }
}

fn error_message(body: String) -> String {
    serde_json::from_str::<GeminiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}
