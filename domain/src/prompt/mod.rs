//! Prompt domain
//!
//! Templates for each step of the turn loop.

pub mod turn;

pub use turn::{ReflectionPrompt, SelectionPrompt, TurnPromptTemplate};
