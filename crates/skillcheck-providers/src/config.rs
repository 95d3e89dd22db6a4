//! Configuration loading and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use skillcheck_core::evaluator::EvaluatorConfig;
use skillcheck_core::session::SessionOptions;
use skillcheck_core::traits::LlmProvider;

use crate::gemini::{GeminiProvider, DEFAULT_MODEL};
use crate::mock::MockProvider;

/// Environment variables that override the Gemini API key, highest priority first.
pub const GEMINI_KEY_VARS: [&str; 2] = ["SKILLCHECK_GEMINI_KEY", "GEMINI_API_KEY"];

/// Configuration for a single provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Mock {
        /// Substring → reply rules. Empty means the built-in grader rules.
        #[serde(default)]
        responses: HashMap<String, String>,
        /// Replies handed out in order before any rule applies.
        #[serde(default)]
        replies: Vec<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Mock { responses, replies } => f
                .debug_struct("Mock")
                .field("responses", &responses.len())
                .field("replies", &replies.len())
                .finish(),
        }
    }
}

/// Top-level skillcheck configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillcheckConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used when none is given on the command line.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model used when none is given on the command line.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature. Unset leaves the model default.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Max tokens per evaluator reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Cap on follow-up questions per quiz question. Unset means unlimited.
    #[serde(default)]
    pub max_follow_ups: Option<u32>,
    /// Turn evaluator failures into the placeholder reply instead of aborting the turn.
    #[serde(default)]
    pub recover_evaluator_errors: bool,
    /// Question bank file. Unset uses the built-in bank.
    #[serde(default)]
    pub question_bank: Option<PathBuf>,
    /// Output directory for session reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./skillcheck-results")
}

impl Default for SkillcheckConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: None,
            max_tokens: default_max_tokens(),
            max_follow_ups: None,
            recover_evaluator_errors: false,
            question_bank: None,
            output_dir: default_output_dir(),
        }
    }
}

impl SkillcheckConfig {
    /// Evaluator settings for `model`.
    pub fn evaluator_config(&self, model: &str) -> EvaluatorConfig {
        EvaluatorConfig {
            model: model.to_string(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            recover_errors: self.recover_evaluator_errors,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            max_follow_ups: self.max_follow_ups,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::Mock { .. } => config.clone(),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `skillcheck.toml` in the current directory
/// 2. `~/.config/skillcheck/config.toml`
///
/// Environment variable overrides: `SKILLCHECK_GEMINI_KEY`, `GEMINI_API_KEY`.
pub fn load_config() -> Result<SkillcheckConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<SkillcheckConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("skillcheck.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => parse_config_file(path)?,
        None => SkillcheckConfig::default(),
    };
    tracing::debug!(path = ?config_path, "configuration loaded");

    // Env var override, read once at startup. Not validated here.
    if let Some(key) = gemini_key_from(|var| std::env::var(var).ok()) {
        let entry = config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            });
        if let ProviderConfig::Gemini { api_key, .. } = entry {
            *api_key = key;
        }
    }

    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

/// First non-empty value among [`GEMINI_KEY_VARS`], in priority order.
fn gemini_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    GEMINI_KEY_VARS
        .iter()
        .find_map(|var| lookup(var).filter(|v| !v.is_empty()))
}

fn parse_config_file(path: &Path) -> Result<SkillcheckConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<SkillcheckConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("skillcheck"))
}

/// Look up `name` in the config and build it. An unconfigured "gemini" gets
/// an empty key, so the failure shows up on the first evaluator call.
pub fn provider_by_name(config: &SkillcheckConfig, name: &str) -> Result<Arc<dyn LlmProvider>> {
    let provider_config = match (config.providers.get(name), name) {
        (Some(c), _) => c.clone(),
        (None, "gemini") => ProviderConfig::Gemini {
            api_key: String::new(),
            base_url: None,
        },
        (None, "mock") => ProviderConfig::Mock {
            responses: HashMap::new(),
            replies: Vec::new(),
        },
        (None, other) => anyhow::bail!(
            "provider '{other}' is not configured. Available: {}",
            config
                .providers
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };
    create_provider(name, &provider_config).map(Arc::from)
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    tracing::debug!(name, ?config, "creating provider");
    match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            Ok(Box::new(GeminiProvider::new(api_key, base_url.clone())?))
        }
        ProviderConfig::Mock { responses, replies } => {
            let mock = if responses.is_empty() {
                MockProvider::grader()
            } else {
                MockProvider::new(responses.clone())
            };
            Ok(Box::new(mock.with_queue(replies.iter().cloned())))
        }
    }
}
