//! Use cases
//!
//! Application-level operations that orchestrate domain logic.
//!
//! - [`retry`]: bounded retry with sampling escalation
//! - [`consensus`]: repeated sampling until enough samples agree
//! - [`run_turn`]: the per-utterance state machine built on both

pub mod consensus;
pub mod retry;
pub mod run_turn;
pub(crate) mod shared;
