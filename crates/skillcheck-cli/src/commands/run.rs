//! The `skillcheck run` command.
//!
//! A terminal session shell: renders new interviewer turns to stdout, reads
//! one answer per stdin line, and writes a report when the session ends.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use skillcheck_core::evaluator::Evaluator;
use skillcheck_core::model::{Turn, TurnRole};
use skillcheck_core::session::Session;
use skillcheck_providers::config::{load_config_from, provider_by_name};
use skillcheck_report::{write_markdown_report, SessionReport};

pub struct RunArgs {
    pub bank: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub max_follow_ups: Option<u32>,
    pub recover_errors: bool,
    pub output: Option<PathBuf>,
    pub format: String,
    pub config: Option<PathBuf>,
}

/// Prints turns that have not been shown yet. User turns are skipped: the
/// terminal already echoed them.
struct TerminalShell<W: Write> {
    out: W,
    rendered: usize,
}

impl<W: Write> TerminalShell<W> {
    fn new(out: W) -> Self {
        Self { out, rendered: 0 }
    }

    fn render(&mut self, history: &[Turn]) -> Result<()> {
        for turn in history.iter().skip(self.rendered) {
            if turn.role == TurnRole::Assistant {
                writeln!(self.out, "Interviewer: {}\n", turn.text)?;
            }
        }
        self.rendered = history.len();
        self.out.flush()?;
        Ok(())
    }
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let formats = parse_formats(&args.format)?;
    let config = load_config_from(args.config.as_deref())?;

    let bank_path = args.bank.or_else(|| config.question_bank.clone());
    let bank = super::load_bank(bank_path.as_deref())?;

    let provider_name = args
        .provider
        .unwrap_or_else(|| config.default_provider.clone());
    let model = args.model.unwrap_or_else(|| config.default_model.clone());
    let provider = provider_by_name(&config, &provider_name)?;

    let mut evaluator_config = config.evaluator_config(&model);
    evaluator_config.recover_errors |= args.recover_errors;
    let mut options = config.session_options();
    if args.max_follow_ups.is_some() {
        options.max_follow_ups = args.max_follow_ups;
    }

    let evaluator = Evaluator::new(provider, evaluator_config);
    let mut session = Session::new(Arc::new(bank), options);
    tracing::info!(
        session = %session.id(),
        bank = %session.bank().id,
        provider = %provider_name,
        model = %model,
        "session started"
    );

    let mut shell = TerminalShell::new(std::io::stdout().lock());
    session.submit_line(None, &evaluator).await?;
    shell.render(session.renderable_history())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !session.is_done() {
        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            tracing::info!(stage = %session.stage(), "input closed before the quiz finished");
            break;
        };
        let line = line.trim_end_matches('\r');

        let result = session.submit_line(Some(line), &evaluator).await;
        shell.render(session.renderable_history())?;
        if let Err(e) = result {
            // The turn is lost but the session stays usable.
            tracing::error!(stage = %session.stage(), "turn failed: {e:#}");
            eprintln!("Error: {e:#}");
        }
    }
    drop(shell);

    let output = args.output.unwrap_or_else(|| config.output_dir.clone());
    let report = SessionReport::from_session(&session, &model);
    write_reports(&report, &output, &formats)?;

    Ok(())
}

fn parse_formats(format: &str) -> Result<Vec<&'static str>> {
    let mut formats = Vec::new();
    for f in format.split(',').map(str::trim) {
        match f {
            "all" => formats.extend(["json", "markdown"]),
            "json" => formats.push("json"),
            "markdown" | "md" => formats.push("markdown"),
            "none" => {}
            other => anyhow::bail!("unknown report format: '{other}'"),
        }
    }
    formats.dedup();
    Ok(formats)
}

fn write_reports(report: &SessionReport, output: &std::path::Path, formats: &[&str]) -> Result<()> {
    if formats.is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create output directory {}", output.display()))?;

    for fmt in formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("{}.json", report.file_stem()));
                report.save_json(&path)?;
                eprintln!("Report saved to: {}", path.display());
            }
            "markdown" => {
                let path = output.join(format!("{}.md", report.file_stem()));
                write_markdown_report(report, &path)?;
                eprintln!("Markdown report: {}", path.display());
            }
            _ => {}
        }
    }
    Ok(())
}
