//! Markdown report generator.

use std::path::Path;

use anyhow::{Context, Result};

use skillcheck_core::model::TurnRole;

use crate::report::SessionReport;

/// Render a report as Markdown: header, per-answer scores, summary, transcript.
pub fn generate_markdown(report: &SessionReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# skillcheck report: {}\n\n", report.bank.name));
    md.push_str(&format!(
        "Session `{}` | model `{}` | {}/{} questions | {}\n",
        report.id,
        report.model,
        report.questions_answered,
        report.bank.question_count,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if !report.is_complete() {
        md.push_str(&format!(
            "\n> Session ended early (stage: {}).\n",
            report.stage
        ));
    }

    if !report.responses.is_empty() {
        // A failed scoring call leaves an answer without a score, so positions
        // only line up when the counts match.
        let paired = report.scores_aligned();

        md.push_str("\n## Answers\n");
        if !paired {
            md.push_str(&format!(
                "\n> {} answers but {} scores: a scoring call failed, so scores are listed separately.\n",
                report.responses.len(),
                report.scores.len()
            ));
        }
        for (i, response) in report.responses.iter().enumerate() {
            md.push_str(&format!("\n### Answer {}\n\n{}\n", i + 1, quote(response)));
            if paired {
                md.push_str(&format!("\n**Score:** {}\n", report.scores[i]));
            }
        }

        if !paired && !report.scores.is_empty() {
            md.push_str("\n## Scores\n");
            for (i, score) in report.scores.iter().enumerate() {
                md.push_str(&format!("\n### Score {}\n\n{}\n", i + 1, quote(score)));
            }
        }
    }

    if let Some(summary) = &report.summary {
        md.push_str(&format!("\n## Summary\n\n{summary}\n"));
    }

    md.push_str("\n## Transcript\n");
    for turn in report.turns() {
        let speaker = match turn.role {
            TurnRole::Assistant => "Interviewer",
            TurnRole::User => "Candidate",
        };
        md.push_str(&format!("\n**{speaker}:** {}\n", turn.text));
    }

    md
}

fn quote(text: &str) -> String {
    text.lines()
        .map(|l| format!("> {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the Markdown rendering of `report` to `path`.
pub fn write_markdown_report(report: &SessionReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, generate_markdown(report))
        .with_context(|| format!("failed to write markdown report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{finished_session, Canned};
    use async_trait::async_trait;
    use skillcheck_core::evaluator::Evaluate;
    use skillcheck_core::model::{Message, QuestionBank};
    use std::sync::atomic::{AtomicBool, Ordering};
    use skillcheck_core::session::{Session, SessionOptions};
    use std::sync::Arc;

    #[tokio::test]
    async fn markdown_has_all_sections() {
        let session = finished_session().await;
        let report = SessionReport::from_session(&session, "gemini-2.5-flash");
        let md = generate_markdown(&report);

        assert!(md.starts_with("# skillcheck report: Mini Bank"));
        assert!(md.contains("2/2 questions"));
        assert!(md.contains("### Answer 2\n\n> a pinned cell"));
        assert!(md.contains("**Score:** Score: 4/5"));
        assert!(md.contains("## Summary\n\nOverall: good"));
        assert!(md.contains("**Candidate:** start"));
        assert!(!md.contains("ended early"));
    }

    #[tokio::test]
    async fn markdown_flags_interrupted_session() {
        let mut session = Session::new(Arc::new(QuestionBank::builtin()), SessionOptions::default());
        session.submit_line(None, &Canned).await.unwrap();
        let report = SessionReport::from_session(&session, "mock-model");
        let md = generate_markdown(&report);

        assert!(md.contains("Session ended early (stage: awaiting_start)"));
        assert!(!md.contains("## Answers"));
        assert!(!md.contains("## Summary"));
    }

    /// Fails the first scoring call, then scores each answer by echoing it.
    struct FirstScoreFails {
        failed: AtomicBool,
    }

    #[async_trait]
    impl Evaluate for FirstScoreFails {
        async fn evaluate(&self, messages: &[Message]) -> anyhow::Result<String> {
            let instruction = messages[0].content();
            if instruction.contains("Score") {
                if !self.failed.swap(true, Ordering::SeqCst) {
                    anyhow::bail!("connection reset");
                }
                let answer = messages[1].content().rsplit("User: ").next().unwrap_or("");
                Ok(format!("score-for:{answer}"))
            } else if instruction.contains("follow-up") {
                Ok("None".into())
            } else {
                Ok("Overall: fine".into())
            }
        }
    }

    #[tokio::test]
    async fn failed_scoring_call_does_not_shift_scores() {
        let mut session = Session::new(Arc::new(QuestionBank::builtin()), SessionOptions::default());
        let eval = FirstScoreFails {
            failed: AtomicBool::new(false),
        };
        session.submit_line(Some("start"), &eval).await.unwrap();
        assert!(session.submit_line(Some("first"), &eval).await.is_err());
        session.submit_line(Some("retry"), &eval).await.unwrap();
        session.submit_line(Some("second"), &eval).await.unwrap();
        assert_eq!(session.responses(), ["first", "retry", "second"]);
        assert_eq!(session.scores(), ["score-for:retry", "score-for:second"]);

        let report = SessionReport::from_session(&session, "mock-model");
        assert!(!report.scores_aligned());
        let md = generate_markdown(&report);

        assert!(md.contains("3 answers but 2 scores"));
        assert!(!md.contains("**Score:**"));
        assert!(md.contains("### Answer 1\n\n> first\n"));
        assert!(md.contains("## Scores\n\n### Score 1\n\n> score-for:retry"));
        assert!(md.contains("### Score 2\n\n> score-for:second"));
    }

    #[test]
    fn quote_prefixes_every_line() {
        assert_eq!(quote("a\nb"), "> a\n> b");
    }

    #[tokio::test]
    async fn writes_file() {
        let session = finished_session().await;
        let report = SessionReport::from_session(&session, "m");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.md");
        write_markdown_report(&report, &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("## Transcript"));
    }
}
