//! The `skillcheck report` command.

use std::path::PathBuf;

use anyhow::Result;

use skillcheck_report::{generate_markdown, SessionReport};

pub fn execute(input: PathBuf) -> Result<()> {
    let report = SessionReport::load_json(&input)?;
    print!("{}", generate_markdown(&report));
    Ok(())
}
