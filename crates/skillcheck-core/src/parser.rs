//! TOML question bank parser.
//!
//! Loads question banks from TOML files and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{QuestionBank, QuestionSpec};

/// Intermediate TOML structure for parsing question bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    prompt: String,
    ideal: String,
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_question_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank file: {}", path.display()))?;

    parse_question_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
pub fn parse_question_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| QuestionSpec::new(q.prompt.trim(), q.ideal.trim()))
        .collect();

    QuestionBank::new(
        parsed.bank.id,
        parsed.bank.name,
        parsed.bank.description,
        questions,
    )
    .with_context(|| format!("invalid question bank: {}", source_path.display()))
}

/// A warning from question bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Zero-based question position (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a question bank for common authoring mistakes.
pub fn validate_question_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen = HashSet::new();
    for (i, q) in bank.questions().iter().enumerate() {
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question: Some(i),
                message: "prompt is empty".into(),
            });
        } else if !seen.insert(q.prompt.trim().to_lowercase()) {
            warnings.push(ValidationWarning {
                question: Some(i),
                message: format!("duplicate prompt: {}", q.prompt.trim()),
            });
        }

        if q.ideal_answer.trim().is_empty() {
            warnings.push(ValidationWarning {
                question: Some(i),
                message: "ideal answer is empty".into(),
            });
        }
    }

    warnings
}
