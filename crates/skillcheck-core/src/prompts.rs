//! Evaluator prompts and fixed assistant texts.

use crate::model::Message;

/// Shown in place of any empty model reply.
pub const EMPTY_RESPONSE_PLACEHOLDER: &str = "Error: No response generated.";

/// The literal the follow-up prompt asks for when no follow-up is needed.
pub const NO_FOLLOW_UP_SENTINEL: &str = "None";

const SCORE_INSTRUCTION: &str = "You are an expert Excel evaluator. Score the user's answer (0-5) for correctness, completeness, clarity. Provide total score and brief reasoning.";

const FOLLOW_UP_INSTRUCTION: &str = "If the answer is incomplete or unclear, suggest a short follow-up question. Else, say 'None'.";

const SUMMARY_INSTRUCTION: &str = "Summarize performance: Overall score, strengths, weaknesses, tips. Based on responses and scores.";

/// Welcome turn emitted on session entry.
pub fn welcome(question_count: usize) -> String {
    format!(
        "Hello! I'm your AI Excel Interviewer powered by Google Gemini. We'll go through {question_count} questions to assess your skills. Answer clearly, and I'll evaluate. Ready? Type 'start'."
    )
}

/// Ask the evaluator to score `answer` against the reference answer.
pub fn score_request(ideal_answer: &str, answer: &str) -> Vec<Message> {
    vec![
        Message::system(SCORE_INSTRUCTION),
        Message::user(format!("Ideal: {ideal_answer}\nUser: {answer}")),
    ]
}

/// Ask the evaluator whether `answer` warrants a follow-up question.
pub fn follow_up_request(answer: &str) -> Vec<Message> {
    vec![
        Message::system(FOLLOW_UP_INSTRUCTION),
        Message::user(answer),
    ]
}

/// Ask the evaluator for the final report over every recorded answer and score.
pub fn summary_request(responses: &[String], scores: &[String]) -> Vec<Message> {
    vec![
        Message::system(SUMMARY_INSTRUCTION),
        Message::user(format!("Responses: {responses:?}\nScores: {scores:?}")),
    ]
}
