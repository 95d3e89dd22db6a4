pub mod init;
pub mod list_models;
pub mod report;
pub mod run;
pub mod show;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use skillcheck_core::model::QuestionBank;
use skillcheck_core::parser;

/// Load `path` if given, otherwise the built-in bank.
pub fn load_bank(path: Option<&Path>) -> Result<QuestionBank> {
    match path {
        Some(p) => parser::parse_question_bank(p),
        None => Ok(QuestionBank::builtin()),
    }
}
