//! skillcheck-providers — model endpoint integrations.
//!
//! Implements the `LlmProvider` trait for Google Gemini plus a scripted mock,
//! the adapter from three-role transcripts to Gemini `contents`, and config
//! loading.

pub mod config;
pub mod contents;
pub mod gemini;
pub mod mock;

pub use config::{create_provider, load_config, ProviderConfig, SkillcheckConfig};
pub use skillcheck_core::error::ProviderError;
