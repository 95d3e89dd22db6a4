//! Session report type with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skillcheck_core::model::{Transcript, Turn, TurnRole};
use skillcheck_core::session::{Session, Stage};

/// A finished (or interrupted) quiz session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Session identifier.
    pub id: Uuid,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Which bank was used.
    pub bank: BankSummary,
    /// Model that did the grading.
    pub model: String,
    /// Stage the session ended in. Anything but `done` means it was cut short.
    pub stage: Stage,
    /// Questions fully answered.
    pub questions_answered: usize,
    /// Every recorded answer.
    pub responses: Vec<String>,
    /// Evaluator output for each answer.
    pub scores: Vec<String>,
    /// Final evaluator summary, present once the session is done.
    #[serde(default)]
    pub summary: Option<String>,
    /// The full visible dialogue.
    pub transcript: Transcript,
}

/// Summary of a question bank (without the questions themselves).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

impl SessionReport {
    pub fn from_session(session: &Session, model: &str) -> Self {
        let state = session.state();
        let summary = if session.is_done() {
            state
                .transcript
                .last()
                .filter(|t| t.role == TurnRole::Assistant)
                .map(|t| t.text.clone())
        } else {
            None
        };

        Self {
            id: state.id,
            started_at: state.started_at,
            created_at: Utc::now(),
            bank: BankSummary {
                id: session.bank().id.clone(),
                name: session.bank().name.clone(),
                question_count: session.bank().len(),
            },
            model: model.to_string(),
            stage: state.stage,
            questions_answered: state.current_question_index,
            responses: state.responses.clone(),
            scores: state.scores.clone(),
            summary,
            transcript: state.transcript.clone(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Whether `scores[i]` belongs to `responses[i]`. A failed scoring call
    /// records the answer without a score and breaks the pairing.
    pub fn scores_aligned(&self) -> bool {
        self.responses.len() == self.scores.len()
    }

    pub fn turns(&self) -> &[Turn] {
        self.transcript.turns()
    }

    /// File stem used for report files: `session-<id>`.
    pub fn file_stem(&self) -> String {
        format!("session-{}", self.id)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
