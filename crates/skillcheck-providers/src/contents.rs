//! Message adapter: three-role transcripts to Gemini `contents`.
//!
//! Gemini only knows `user` and `model` turns. System messages are folded:
//! the first message becomes a `user` entry if nothing precedes it, otherwise
//! its text is appended to the most recent entry, whatever that entry's role.

use serde::{Deserialize, Serialize};

use skillcheck_core::model::Message;

/// Separator placed before a folded system message.
pub const SYSTEM_FOLD_MARKER: &str = "\n\nSystem instruction: ";

/// Role of a Gemini content entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    User,
    Model,
}

/// A text part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One `contents` entry: `{"role": "user", "parts": [{"text": "..."}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: ContentRole,
    pub parts: Vec<Part>,
}

impl Content {
    fn text(role: ContentRole, text: &str) -> Self {
        Self {
            role,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    /// Text of the first part, or `""` when there are no parts.
    pub fn first_text(&self) -> &str {
        self.parts.first().map(|p| p.text.as_str()).unwrap_or("")
    }
}

/// Convert a role-tagged transcript into Gemini `contents`, preserving order.
///
/// The result never has more entries than the input.
pub fn to_gemini_contents(messages: &[Message]) -> Vec<Content> {
    let mut contents: Vec<Content> = Vec::with_capacity(messages.len());

    for message in messages {
        match message {
            Message::User(text) => contents.push(Content::text(ContentRole::User, text)),
            Message::Assistant(text) => contents.push(Content::text(ContentRole::Model, text)),
            Message::System(text) => match contents.last_mut() {
                None => contents.push(Content::text(ContentRole::User, text)),
                Some(last) => {
                    let folded = format!("{SYSTEM_FOLD_MARKER}{text}");
                    match last.parts.first_mut() {
                        Some(part) => part.text.push_str(&folded),
                        None => last.parts.push(Part { text: folded }),
                    }
                }
            },
        }
    }

    contents
}
