//! The `skillcheck validate` command.

use std::path::PathBuf;

use anyhow::Result;

use skillcheck_core::parser;

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let bank = parser::parse_question_bank(&bank_path)?;

    println!("Question bank: {} ({} questions)", bank.name, bank.len());

    let warnings = parser::validate_question_bank(&bank);
    for w in &warnings {
        let prefix = w
            .question
            .map(|i| format!("  [Q{}]", i + 1))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Question bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
