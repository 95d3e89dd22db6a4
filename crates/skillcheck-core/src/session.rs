//! Conversation state machine.
//!
//! Drives one quiz session: welcome, wait for "start", ask each question,
//! score the answer, optionally ask a follow-up, and finally summarize.
//! [`Session::step`] performs exactly one transition; [`Session::submit_line`]
//! is what a shell calls once per user line.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::evaluator::Evaluate;
use crate::model::{QuestionBank, Transcript, Turn};
use crate::prompts::{self, NO_FOLLOW_UP_SENTINEL};

/// The quiz's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Intro,
    AwaitingStart,
    Asking,
    AwaitingAnswer,
    Summarizing,
    Done,
}

impl Stage {
    /// Whether this stage consumes a user line. The others run on entry.
    pub fn takes_input(self) -> bool {
        matches!(self, Stage::AwaitingStart | Stage::AwaitingAnswer)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Intro => write!(f, "intro"),
            Stage::AwaitingStart => write!(f, "awaiting_start"),
            Stage::Asking => write!(f, "asking"),
            Stage::AwaitingAnswer => write!(f, "awaiting_answer"),
            Stage::Summarizing => write!(f, "summarizing"),
            Stage::Done => write!(f, "done"),
        }
    }
}

/// `true` when a follow-up reply means "no follow-up needed".
///
/// Exact match against `"None"` after trimming surrounding whitespace;
/// everything else, including `"none"`, is a follow-up question.
pub fn is_no_follow_up(text: &str) -> bool {
    text.trim() == NO_FOLLOW_UP_SENTINEL
}

fn is_start_command(input: &str) -> bool {
    input.to_lowercase() == "start"
}

/// Per-session knobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Cap on follow-up questions per quiz question. `None` means unlimited.
    #[serde(default)]
    pub max_follow_ups: Option<u32>,
}

/// Everything a session owns. Mutated only by [`Session`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Session identifier, used in logs and reports.
    pub id: Uuid,
    /// When the session was created.
    pub started_at: DateTime<Utc>,
    pub stage: Stage,
    /// Index of the question being asked; reaches the bank length exactly once.
    pub current_question_index: usize,
    /// Every recorded answer, in order.
    pub responses: Vec<String>,
    /// Evaluator score text for each entry in `responses`.
    pub scores: Vec<String>,
    pub transcript: Transcript,
    /// Follow-ups issued for the current question.
    #[serde(default)]
    pub follow_ups_for_current: u32,
}

impl SessionState {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            stage: Stage::Intro,
            current_question_index: 0,
            responses: Vec::new(),
            scores: Vec::new(),
            transcript: Transcript::new(),
            follow_ups_for_current: 0,
        }
    }
}

/// Result of a single [`Session::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A transition happened; the machine may be able to continue without input.
    Advanced,
    /// The stage waits for a user line and none was given.
    NeedsInput,
    /// A line was given but the stage discarded it.
    Ignored,
    /// The session is done.
    Finished,
}

/// One quiz session over a shared question bank.
pub struct Session {
    bank: Arc<QuestionBank>,
    options: SessionOptions,
    state: SessionState,
}

impl Session {
    pub fn new(bank: Arc<QuestionBank>, options: SessionOptions) -> Self {
        Self {
            bank,
            options,
            state: SessionState::new(),
        }
    }

    /// Resume from previously captured state.
    pub fn from_state(
        bank: Arc<QuestionBank>,
        options: SessionOptions,
        state: SessionState,
    ) -> Result<Self> {
        anyhow::ensure!(
            state.current_question_index <= bank.len(),
            "question index {} is past the end of bank '{}' ({} questions)",
            state.current_question_index,
            bank.id,
            bank.len()
        );
        anyhow::ensure!(
            state.responses.len() >= state.scores.len(),
            "session has more scores ({}) than responses ({})",
            state.scores.len(),
            state.responses.len()
        );
        Ok(Self {
            bank,
            options,
            state,
        })
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub fn id(&self) -> Uuid {
        self.state.id
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    pub fn current_question_index(&self) -> usize {
        self.state.current_question_index
    }

    pub fn responses(&self) -> &[String] {
        &self.state.responses
    }

    pub fn scores(&self) -> &[String] {
        &self.state.scores
    }

    pub fn is_done(&self) -> bool {
        self.state.stage == Stage::Done
    }

    /// Read-only view of the visible dialogue.
    pub fn renderable_history(&self) -> &[Turn] {
        self.state.transcript.turns()
    }

    /// Feed one user line (or `None` when nothing was typed this cycle) and run
    /// until the session needs more input or is done.
    ///
    /// A line given while the session is on a stage that does not read input
    /// is held until the next stage that does. At most one line is consumed.
    #[instrument(skip_all, fields(session = %self.state.id))]
    pub async fn submit_line(
        &mut self,
        input: Option<&str>,
        evaluator: &dyn Evaluate,
    ) -> Result<()> {
        let mut pending = input;
        loop {
            let line = if self.state.stage.takes_input() {
                pending.take()
            } else {
                None
            };
            match self.step(line, evaluator).await? {
                StepOutcome::Advanced => continue,
                StepOutcome::NeedsInput | StepOutcome::Ignored | StepOutcome::Finished => {
                    return Ok(())
                }
            }
        }
    }

    /// Perform exactly one transition.
    ///
    /// Stages that run on entry ignore `input`. On evaluator failure the
    /// already recorded turns stay recorded and the stage is unchanged.
    pub async fn step(
        &mut self,
        input: Option<&str>,
        evaluator: &dyn Evaluate,
    ) -> Result<StepOutcome> {
        let before = self.state.stage;
        let outcome = match self.state.stage {
            Stage::Intro => {
                self.state
                    .transcript
                    .push_assistant(prompts::welcome(self.bank.len()));
                self.state.stage = Stage::AwaitingStart;
                StepOutcome::Advanced
            }
            Stage::AwaitingStart => match input {
                None => StepOutcome::NeedsInput,
                Some(line) if is_start_command(line) => {
                    self.state.transcript.push_user(line);
                    self.state.stage = Stage::Asking;
                    StepOutcome::Advanced
                }
                Some(_) => StepOutcome::Ignored,
            },
            Stage::Asking => {
                match self.bank.get(self.state.current_question_index) {
                    Some(question) => {
                        self.state.transcript.push_assistant(question.prompt.clone());
                        self.state.stage = Stage::AwaitingAnswer;
                    }
                    None => self.state.stage = Stage::Summarizing,
                }
                StepOutcome::Advanced
            }
            Stage::AwaitingAnswer => match input {
                None => StepOutcome::NeedsInput,
                Some("") => StepOutcome::Ignored,
                Some(answer) => {
                    self.record_answer(answer, evaluator).await?;
                    StepOutcome::Advanced
                }
            },
            Stage::Summarizing => {
                let request = prompts::summary_request(&self.state.responses, &self.state.scores);
                let report = evaluator.evaluate(&request).await?;
                self.state.transcript.push_assistant(report);
                self.state.stage = Stage::Done;
                StepOutcome::Finished
            }
            Stage::Done => StepOutcome::Finished,
        };

        if before != self.state.stage {
            tracing::debug!(
                from = %before,
                to = %self.state.stage,
                index = self.state.current_question_index,
                "stage transition"
            );
        }
        Ok(outcome)
    }

    async fn record_answer(&mut self, answer: &str, evaluator: &dyn Evaluate) -> Result<()> {
        let index = self.state.current_question_index;
        let ideal = self
            .bank
            .get(index)
            .map(|q| q.ideal_answer.clone())
            .ok_or_else(|| anyhow::anyhow!("no question at index {index} to answer"))?;

        self.state.transcript.push_user(answer);
        self.state.responses.push(answer.to_string());

        let score = evaluator
            .evaluate(&prompts::score_request(&ideal, answer))
            .await?;
        tracing::debug!(index, "answer scored");
        self.state.scores.push(score);

        let follow_up = evaluator
            .evaluate(&prompts::follow_up_request(answer))
            .await?;

        if is_no_follow_up(&follow_up) {
            self.advance_question();
        } else if self
            .options
            .max_follow_ups
            .is_some_and(|cap| self.state.follow_ups_for_current >= cap)
        {
            tracing::debug!(index, "follow-up limit reached, advancing");
            self.advance_question();
        } else {
            self.state.transcript.push_assistant(follow_up);
            self.state.follow_ups_for_current += 1;
        }
        Ok(())
    }

    fn advance_question(&mut self) {
        self.state.current_question_index += 1;
        self.state.follow_ups_for_current = 0;
        self.state.stage = Stage::Asking;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::ProviderError;
    use crate::evaluator::{Evaluator, EvaluatorConfig};
    use crate::model::{Message, QuestionSpec, TurnRole};
    use crate::prompts::EMPTY_RESPONSE_PLACEHOLDER;
    use crate::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage};

    /// Answers by prompt kind: fixed score, queued follow-ups (then "None"), fixed summary.
    struct ScriptedEvaluator {
        follow_ups: Mutex<VecDeque<String>>,
        fail_scoring: bool,
        calls: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedEvaluator {
        fn new() -> Self {
            Self::with_follow_ups(&[])
        }

        fn with_follow_ups(replies: &[&str]) -> Self {
            Self {
                follow_ups: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
                fail_scoring: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Evaluate for ScriptedEvaluator {
        async fn evaluate(&self, messages: &[Message]) -> anyhow::Result<String> {
            self.calls.lock().unwrap().push(messages.to_vec());
            let instruction = messages[0].content();
            if instruction.contains("Score the user's answer") {
                if self.fail_scoring {
                    return Err(ProviderError::NetworkError("connection reset".into()).into());
                }
                Ok("Score: 4/5".into())
            } else if instruction.contains("follow-up") {
                Ok(self
                    .follow_ups
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| "None".into()))
            } else {
                Ok("Overall: strong fundamentals".into())
            }
        }
    }

    /// Provider whose replies are always empty.
    struct SilentProvider;

    #[async_trait]
    impl LlmProvider for SilentProvider {
        fn name(&self) -> &str {
            "silent"
        }

        async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            Ok(GenerateResponse {
                content: String::new(),
                model: request.model.clone(),
                token_usage: TokenUsage::default(),
                latency_ms: 0,
            })
        }

        fn available_models(&self) -> Vec<ModelInfo> {
            vec![]
        }
    }

    fn builtin_session() -> Session {
        Session::new(Arc::new(QuestionBank::builtin()), SessionOptions::default())
    }

    fn texts(session: &Session) -> Vec<(TurnRole, String)> {
        session
            .renderable_history()
            .iter()
            .map(|t| (t.role, t.text.clone()))
            .collect()
    }

    #[tokio::test]
    async fn intro_then_waits_for_start() {
        let mut session = builtin_session();
        let eval = ScriptedEvaluator::new();

        session.submit_line(None, &eval).await.unwrap();
        assert_eq!(session.stage(), Stage::AwaitingStart);
        assert_eq!(session.renderable_history().len(), 1);
        assert!(session.renderable_history()[0]
            .text
            .contains("go through 5 questions"));

        // Absent input: nothing happens.
        session.submit_line(None, &eval).await.unwrap();
        assert_eq!(session.renderable_history().len(), 1);
        assert_eq!(eval.call_count(), 0);
    }

    #[tokio::test]
    async fn non_start_input_is_ignored_without_a_turn() {
        let mut session = builtin_session();
        let eval = ScriptedEvaluator::new();
        session.submit_line(None, &eval).await.unwrap();

        for line in ["hello", "", " start", "begin"] {
            session.submit_line(Some(line), &eval).await.unwrap();
            assert_eq!(session.stage(), Stage::AwaitingStart, "input {line:?}");
        }
        assert_eq!(session.renderable_history().len(), 1);
    }

    #[tokio::test]
    async fn start_is_case_insensitive() {
        for word in ["start", "START", "Start", "sTaRt"] {
            let mut session = builtin_session();
            let eval = ScriptedEvaluator::new();
            session.submit_line(None, &eval).await.unwrap();
            session.submit_line(Some(word), &eval).await.unwrap();

            assert_eq!(session.stage(), Stage::AwaitingAnswer, "input {word:?}");
            let history = texts(&session);
            assert_eq!(history[1], (TurnRole::User, word.to_string()));
            assert_eq!(
                history[2],
                (
                    TurnRole::Assistant,
                    QuestionBank::builtin().get(0).unwrap().prompt.clone()
                )
            );
        }
    }

    #[tokio::test]
    async fn line_given_during_intro_is_carried_to_start() {
        let mut session = builtin_session();
        let eval = ScriptedEvaluator::new();
        session.submit_line(Some("start"), &eval).await.unwrap();

        assert_eq!(session.stage(), Stage::AwaitingAnswer);
        assert_eq!(session.renderable_history().len(), 3);
    }

    #[tokio::test]
    async fn step_walks_one_transition_at_a_time() {
        let mut session = builtin_session();
        let eval = ScriptedEvaluator::new();

        assert_eq!(
            session.step(Some("start"), &eval).await.unwrap(),
            StepOutcome::Advanced
        );
        // Intro never reads input.
        assert_eq!(session.stage(), Stage::AwaitingStart);
        assert_eq!(session.renderable_history().len(), 1);

        assert_eq!(
            session.step(None, &eval).await.unwrap(),
            StepOutcome::NeedsInput
        );
        assert_eq!(
            session.step(Some("nope"), &eval).await.unwrap(),
            StepOutcome::Ignored
        );
        assert_eq!(
            session.step(Some("start"), &eval).await.unwrap(),
            StepOutcome::Advanced
        );
        assert_eq!(session.stage(), Stage::Asking);
    }

    #[tokio::test]
    async fn full_quiz_without_follow_ups() {
        let mut session = builtin_session();
        let eval = ScriptedEvaluator::new();
        session.submit_line(None, &eval).await.unwrap();
        session.submit_line(Some("start"), &eval).await.unwrap();

        for i in 0..4 {
            session
                .submit_line(Some(&format!("answer {i}")), &eval)
                .await
                .unwrap();
            assert_eq!(session.current_question_index(), i + 1);
            assert_eq!(session.stage(), Stage::AwaitingAnswer);
        }

        // Last answer: drive by single steps to observe Summarizing.
        assert_eq!(
            session.step(Some("answer 4"), &eval).await.unwrap(),
            StepOutcome::Advanced
        );
        assert_eq!(session.stage(), Stage::Asking);
        session.step(None, &eval).await.unwrap();
        assert_eq!(session.stage(), Stage::Summarizing);
        assert_eq!(session.current_question_index(), 5);

        assert_eq!(
            session.step(None, &eval).await.unwrap(),
            StepOutcome::Finished
        );
        assert!(session.is_done());
        assert_eq!(session.responses().len(), 5);
        assert_eq!(session.scores().len(), 5);

        let last = session.renderable_history().last().unwrap();
        assert_eq!(last.role, TurnRole::Assistant);
        assert_eq!(last.text, "Overall: strong fundamentals");
        // welcome + start + 5 * (question + answer) + summary
        assert_eq!(session.renderable_history().len(), 13);
        // 5 * (score + follow-up) + summary
        assert_eq!(eval.call_count(), 11);
    }

    #[tokio::test]
    async fn summary_request_carries_all_responses_and_scores() {
        let bank = QuestionBank::new(
            "one",
            "One",
            "",
            vec![QuestionSpec::new("Q?", "A.")],
        )
        .unwrap();
        let mut session = Session::new(Arc::new(bank), SessionOptions::default());
        let eval = ScriptedEvaluator::new();
        session.submit_line(Some("start"), &eval).await.unwrap();
        session.submit_line(Some("my answer"), &eval).await.unwrap();

        assert!(session.is_done());
        let calls = eval.calls.lock().unwrap();
        assert_eq!(calls[0][1].content(), "Ideal: A.\nUser: my answer");
        assert_eq!(calls[1][1].content(), "my answer");
        assert_eq!(
            calls[2][1].content(),
            "Responses: [\"my answer\"]\nScores: [\"Score: 4/5\"]"
        );
    }

    #[tokio::test]
    async fn follow_up_keeps_question_index() {
        let mut session = builtin_session();
        let eval = ScriptedEvaluator::with_follow_ups(&["Can you give an example?"]);
        session.submit_line(Some("start"), &eval).await.unwrap();

        session.submit_line(Some("dollar signs"), &eval).await.unwrap();
        assert_eq!(session.current_question_index(), 0);
        assert_eq!(session.stage(), Stage::AwaitingAnswer);
        assert_eq!(
            session.renderable_history().last().unwrap().text,
            "Can you give an example?"
        );

        // The reply to the follow-up is recorded and scored against the same question.
        session.submit_line(Some("$A$1 stays put"), &eval).await.unwrap();
        assert_eq!(session.current_question_index(), 1);
        assert_eq!(session.responses(), ["dollar signs", "$A$1 stays put"]);
        assert_eq!(session.scores().len(), 2);
    }

    #[tokio::test]
    async fn sentinel_is_exact_after_trimming() {
        let cases = [
            ("None", true),
            ("  None\n", true),
            ("none", false),
            ("NONE", false),
            ("None.", false),
            ("No", false),
            ("None needed, but why $?", false),
        ];
        for (reply, advances) in cases {
            assert_eq!(is_no_follow_up(reply), advances, "reply {reply:?}");

            let mut session = builtin_session();
            let eval = ScriptedEvaluator::with_follow_ups(&[reply]);
            session.submit_line(Some("start"), &eval).await.unwrap();
            let before = session.renderable_history().len();
            session.submit_line(Some("an answer"), &eval).await.unwrap();

            if advances {
                assert_eq!(session.current_question_index(), 1);
                // answer + next question
                assert_eq!(session.renderable_history().len(), before + 2);
            } else {
                assert_eq!(session.current_question_index(), 0);
                // answer + follow-up
                assert_eq!(session.renderable_history().len(), before + 2);
                assert_eq!(session.renderable_history().last().unwrap().text, reply);
            }
        }
    }

    #[tokio::test]
    async fn follow_up_cap_forces_advance() {
        let mut session = Session::new(
            Arc::new(QuestionBank::builtin()),
            SessionOptions {
                max_follow_ups: Some(1),
            },
        );
        let eval = ScriptedEvaluator::with_follow_ups(&["Why?", "Why again?", "And again?"]);
        session.submit_line(Some("start"), &eval).await.unwrap();

        session.submit_line(Some("first"), &eval).await.unwrap();
        assert_eq!(session.current_question_index(), 0);
        session.submit_line(Some("second"), &eval).await.unwrap();
        assert_eq!(session.current_question_index(), 1);
        assert_eq!(session.state().follow_ups_for_current, 0);

        // The counter restarted, so the next question gets its own follow-up.
        session.submit_line(Some("third"), &eval).await.unwrap();
        assert_eq!(session.current_question_index(), 1);
        assert_eq!(
            session.renderable_history().last().unwrap().text,
            "And again?"
        );
    }

    #[tokio::test]
    async fn empty_model_output_shows_placeholder() {
        let evaluator = Evaluator::new(Arc::new(SilentProvider), EvaluatorConfig::default());
        let bank = QuestionBank::new(
            "one",
            "One",
            "",
            vec![QuestionSpec::new("Q?", "A.")],
        )
        .unwrap();
        let mut session = Session::new(Arc::new(bank), SessionOptions::default());
        session.submit_line(Some("start"), &evaluator).await.unwrap();
        session.submit_line(Some("answer"), &evaluator).await.unwrap();

        // The placeholder is not the sentinel, so it surfaces as a follow-up.
        assert_eq!(session.scores(), [EMPTY_RESPONSE_PLACEHOLDER]);
        let last = session.renderable_history().last().unwrap();
        assert_eq!(last.text, EMPTY_RESPONSE_PLACEHOLDER);
        assert!(session
            .renderable_history()
            .iter()
            .all(|t| !t.text.is_empty()));
    }

    #[tokio::test]
    async fn empty_answer_is_ignored() {
        let mut session = builtin_session();
        let eval = ScriptedEvaluator::new();
        session.submit_line(Some("start"), &eval).await.unwrap();
        let before = session.renderable_history().len();

        session.submit_line(Some(""), &eval).await.unwrap();
        assert_eq!(session.renderable_history().len(), before);
        assert!(session.responses().is_empty());
        assert_eq!(eval.call_count(), 0);
        assert_eq!(session.stage(), Stage::AwaitingAnswer);
    }

    #[tokio::test]
    async fn whitespace_answer_is_recorded_and_scored() {
        let mut session = builtin_session();
        let eval = ScriptedEvaluator::new();
        session.submit_line(Some("start"), &eval).await.unwrap();

        session.submit_line(Some("   "), &eval).await.unwrap();
        assert_eq!(session.responses(), ["   "]);
        assert_eq!(session.scores(), ["Score: 4/5"]);
        assert_eq!(eval.call_count(), 2);
        assert_eq!(session.current_question_index(), 1);
    }

    #[tokio::test]
    async fn evaluator_failure_interrupts_turn_but_keeps_answer() {
        let mut session = builtin_session();
        let mut eval = ScriptedEvaluator::new();
        eval.fail_scoring = true;
        session.submit_line(Some("start"), &eval).await.unwrap();

        let err = session
            .submit_line(Some("my answer"), &eval)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("network error"));
        assert_eq!(session.stage(), Stage::AwaitingAnswer);
        assert_eq!(session.current_question_index(), 0);
        assert_eq!(session.responses(), ["my answer"]);
        assert!(session.scores().is_empty());
        assert_eq!(session.renderable_history().last().unwrap().text, "my answer");
    }

    #[tokio::test]
    async fn done_is_terminal() {
        let bank = QuestionBank::new(
            "one",
            "One",
            "",
            vec![QuestionSpec::new("Q?", "A.")],
        )
        .unwrap();
        let mut session = Session::new(Arc::new(bank), SessionOptions::default());
        let eval = ScriptedEvaluator::new();
        session.submit_line(Some("start"), &eval).await.unwrap();
        session.submit_line(Some("answer"), &eval).await.unwrap();
        assert!(session.is_done());

        let len = session.renderable_history().len();
        let calls = eval.call_count();
        for line in [Some("start"), Some("more"), None] {
            session.submit_line(line, &eval).await.unwrap();
        }
        assert_eq!(session.renderable_history().len(), len);
        assert_eq!(eval.call_count(), calls);
        assert_eq!(session.current_question_index(), 1);
    }

    #[tokio::test]
    async fn index_is_monotone_and_bounded() {
        let mut session = builtin_session();
        let eval = ScriptedEvaluator::with_follow_ups(&["Why?", "None", "Example?", "Hmm?"]);
        let inputs = [
            None,
            Some("hi"),
            Some("start"),
            Some("a"),
            Some("b"),
            None,
            Some("c"),
            Some("d"),
            Some("e"),
            Some(""),
            Some("f"),
            Some("g"),
            Some("h"),
            Some("i"),
            Some("j"),
            Some("k"),
        ];

        let mut last_index = 0;
        for input in inputs {
            session.submit_line(input, &eval).await.unwrap();
            let index = session.current_question_index();
            assert!(index >= last_index);
            assert!(index <= session.bank().len());
            last_index = index;
        }
        assert!(session.is_done());
        assert_eq!(last_index, 5);
    }

    #[tokio::test]
    async fn same_inputs_give_same_transcript() {
        let inputs = [None, Some("start"), Some("a"), Some("b"), Some("c")];

        let mut runs = Vec::new();
        for _ in 0..2 {
            let mut session = builtin_session();
            let eval = ScriptedEvaluator::with_follow_ups(&["Why?"]);
            for input in inputs {
                session.submit_line(input, &eval).await.unwrap();
            }
            runs.push(session.into_state().transcript);
        }

        assert_eq!(runs[0].len(), runs[1].len());
        assert!(runs[0]
            .turns()
            .iter()
            .zip(runs[1].turns())
            .all(|(a, b)| a.same_utterance(b)));
    }

    #[tokio::test]
    async fn resume_from_state() {
        let bank = Arc::new(QuestionBank::builtin());
        let mut session = Session::new(bank.clone(), SessionOptions::default());
        let eval = ScriptedEvaluator::new();
        session.submit_line(Some("start"), &eval).await.unwrap();
        session.submit_line(Some("a"), &eval).await.unwrap();

        let json = serde_json::to_string(session.state()).unwrap();
        let state: SessionState = serde_json::from_str(&json).unwrap();
        let mut resumed =
            Session::from_state(bank.clone(), SessionOptions::default(), state).unwrap();
        assert_eq!(resumed.stage(), Stage::AwaitingAnswer);
        assert_eq!(resumed.current_question_index(), 1);

        resumed.submit_line(Some("b"), &eval).await.unwrap();
        assert_eq!(resumed.current_question_index(), 2);

        let mut bad = resumed.into_state();
        bad.current_question_index = 9;
        assert!(Session::from_state(bank, SessionOptions::default(), bad).is_err());
    }

    #[test]
    fn stage_display_matches_serde() {
        for stage in [
            Stage::Intro,
            Stage::AwaitingStart,
            Stage::Asking,
            Stage::AwaitingAnswer,
            Stage::Summarizing,
            Stage::Done,
        ] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{stage}\""));
        }
        assert!(Stage::AwaitingAnswer.takes_input());
        assert!(!Stage::Summarizing.takes_input());
    }
}
