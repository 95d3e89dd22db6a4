//! skillcheck-core — Conversation state machine, question bank and evaluator.
//!
//! This crate defines the data model, the evaluator seam, and the quiz driver
//! that the rest of skillcheck builds on. It never talks to the network itself:
//! model access goes through the [`traits::LlmProvider`] trait.

pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod prompts;
pub mod session;
pub mod traits;
