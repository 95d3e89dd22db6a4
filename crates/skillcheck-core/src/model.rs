//! Core data model types for skillcheck.
//!
//! These are the types the whole system uses to represent chat messages sent
//! to the evaluator, the visible transcript, and the question bank.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Evaluator messages
// ---------------------------------------------------------------------------

/// The three-way role vocabulary used when talking to the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged message in an evaluator request.
///
/// Serialized as `{"role": "...", "content": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum Message {
    System(String),
    User(String),
    Assistant(String),
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System(content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User(content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant(content.into())
    }

    pub fn role(&self) -> Role {
        match self {
            Message::System(_) => Role::System,
            Message::User(_) => Role::User,
            Message::Assistant(_) => Role::Assistant,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::System(c) | Message::User(c) | Message::Assistant(c) => c,
        }
    }
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Who owns a visible turn. The transcript never carries system turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One rendered line of dialogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Who said it.
    pub role: TurnRole,
    /// What was said.
    pub text: String,
    /// When the turn was appended.
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            at: Utc::now(),
        }
    }

    /// Compare role and text, ignoring the timestamp.
    pub fn same_utterance(&self, other: &Turn) -> bool {
        self.role == other.role && self.text == other.text
    }
}

/// Append-only sequence of turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::new(TurnRole::User, text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::new(TurnRole::Assistant, text));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Question bank
// ---------------------------------------------------------------------------

/// A single quiz question with the reference answer used for scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSpec {
    /// Text shown to the user.
    pub prompt: String,
    /// Reference answer handed to the evaluator.
    #[serde(rename = "ideal")]
    pub ideal_answer: String,
}

impl QuestionSpec {
    pub fn new(prompt: impl Into<String>, ideal_answer: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ideal_answer: ideal_answer.into(),
        }
    }
}

/// A fixed, ordered, non-empty list of questions.
///
/// Immutable once built; sessions share it behind an `Arc`.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionBank {
    /// Unique identifier for this bank.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of what the bank assesses.
    pub description: String,
    questions: Vec<QuestionSpec>,
}

impl QuestionBank {
    /// Build a bank. Fails if `questions` is empty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        questions: Vec<QuestionSpec>,
    ) -> anyhow::Result<Self> {
        let id = id.into();
        anyhow::ensure!(
            !questions.is_empty(),
            "question bank '{id}' must contain at least one question"
        );
        Ok(Self {
            id,
            name: name.into(),
            description: description.into(),
            questions,
        })
    }

    /// The five-question Excel bank used when no bank file is configured.
    pub fn builtin() -> Self {
        let questions = BUILTIN_QUESTIONS
            .iter()
            .map(|(prompt, ideal)| QuestionSpec::new(*prompt, *ideal))
            .collect();
        Self {
            id: "excel".into(),
            name: "Excel Skills".into(),
            description: "Core spreadsheet skills: references, lookups, pivots, formatting, cleanup"
                .into(),
            questions,
        }
    }

    pub fn questions(&self) -> &[QuestionSpec] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&QuestionSpec> {
        self.questions.get(index)
    }

    /// Number of questions, always at least one.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

const BUILTIN_QUESTIONS: [(&str, &str); 5] = [
    (
        "Explain the difference between relative and absolute cell references in Excel.",
        "Relative references change when copied (e.g., A1 becomes B1). Absolute uses $ (e.g., $A$1 stays fixed). Mixed like $A1 fixes column.",
    ),
    (
        "How would you use VLOOKUP to find a value in a table? Provide an example formula.",
        "VLOOKUP(lookup_value, table_array, col_index_num, [range_lookup]). Example: =VLOOKUP(A2, B2:D100, 3, FALSE) for exact match.",
    ),
    (
        "What is a pivot table and how do you create one in Excel?",
        "Summarizes data. Select data > Insert > PivotTable > Choose location > Drag fields to rows/columns/values.",
    ),
    (
        "Describe how to use conditional formatting in Excel.",
        "Highlights cells based on rules. Home > Conditional Formatting > Choose rule (e.g., greater than) > Set format.",
    ),
    (
        "How can you remove duplicates from a dataset in Excel?",
        "Select data > Data > Remove Duplicates > Choose columns.",
    ),
];
