//! skillcheck-report — Session report export.
//!
//! Builds a [`report::SessionReport`] from a session and writes it as JSON or
//! Markdown.

pub mod markdown;
pub mod report;

pub use markdown::{generate_markdown, write_markdown_report};
pub use report::{BankSummary, SessionReport};
