//! Mock provider for tests and offline runs.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use skillcheck_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage,
};

/// A mock LLM provider for driving sessions without real API calls.
///
/// Reply selection, in order: the next queued reply, then the first
/// substring rule matching the request text, then the default reply.
pub struct MockProvider {
    /// Ordered (substring, reply) rules matched against all message text.
    rules: Vec<(String, String)>,
    /// Replies handed out first, one per call.
    queue: Mutex<VecDeque<String>>,
    /// Default reply if nothing else applies.
    default_response: String,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Create a mock from substring→reply rules.
    ///
    /// Rules are tried in key order so matching is deterministic.
    pub fn new(responses: HashMap<String, String>) -> Self {
        let mut rules: Vec<(String, String)> = responses.into_iter().collect();
        rules.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            rules,
            queue: Mutex::new(VecDeque::new()),
            default_response: "None".to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        let mut mock = Self::new(HashMap::new());
        mock.default_response = response.to_string();
        mock
    }

    /// Mock that answers like a cooperative grader: scores every answer,
    /// never asks follow-ups, and writes a one-line summary.
    pub fn grader() -> Self {
        let mut rules = HashMap::new();
        rules.insert(
            "Score the user's answer".to_string(),
            "Score: 3/5. Correct but brief.".to_string(),
        );
        rules.insert("follow-up question".to_string(), "None".to_string());
        rules.insert(
            "Summarize performance".to_string(),
            "Overall: 15/25. Solid basics; practice lookups.".to_string(),
        );
        Self::new(rules)
    }

    /// Queue replies returned before any rule is consulted.
    pub fn with_queue<I, S>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(replies.into_iter().map(Into::into));
        self
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        let haystack: String = request
            .messages
            .iter()
            .map(|m| m.content())
            .collect::<Vec<_>>()
            .join("\n");

        let queued = self
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        let content = queued.unwrap_or_else(|| {
            self.rules
                .iter()
                .find(|(key, _)| haystack.contains(key.as_str()))
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| self.default_response.clone())
        });

        let prompt_tokens = (haystack.len() / 4) as u32; // Rough estimate
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
        }]
    }
}
