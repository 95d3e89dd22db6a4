//! The `skillcheck init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("skillcheck.toml").exists() {
        println!("skillcheck.toml already exists, skipping.");
    } else {
        std::fs::write("skillcheck.toml", SAMPLE_CONFIG)?;
        println!("Created skillcheck.toml");
    }

    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Put your key in GEMINI_API_KEY (or a .env file)");
    println!("  2. Run: skillcheck validate --bank banks/example.toml");
    println!("  3. Run: skillcheck run --bank banks/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# skillcheck configuration

default_provider = "gemini"
default_model = "gemini-2.5-flash"
max_tokens = 1024
# max_follow_ups = 2
# recover_evaluator_errors = true
# question_bank = "banks/example.toml"
output_dir = "./skillcheck-results"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.offline]
type = "mock"
"#;

const EXAMPLE_BANK: &str = r#"[bank]
id = "example"
name = "Example Bank"
description = "Two spreadsheet questions to get started"

[[questions]]
prompt = "What does the SUMIF function do? Give an example formula."
ideal = "Adds cells that meet one condition. Example: =SUMIF(A2:A10, \">100\", B2:B10)."

[[questions]]
prompt = "How do you freeze the top row of a worksheet?"
ideal = "View > Freeze Panes > Freeze Top Row."
"#;
