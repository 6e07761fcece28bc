//! Type definitions for the RunTurn use case.

use helm_domain::{TurnOutput, TurnState};
use thiserror::Error;

/// Errors that can escape a turn.
///
/// Every other failure (generation outages, tool errors, malformed replies,
/// iteration exhaustion) ends as a [`TurnOutput`] branch instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunTurnError {
    #[error("Turn cancelled")]
    Cancelled,
}

impl RunTurnError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunTurnError::Cancelled)
    }
}

/// What a state handler decided.
///
/// Each handler returns exactly one of these; there is no fallthrough.
#[derive(Debug)]
pub(super) enum Transition {
    Next(TurnState),
    Finish(TurnOutput),
}
