//! Turn progress port.
//!
//! [`TurnProgressNotifier`] is an **output port** the presentation layer
//! implements to show what the turn loop is doing. Every callback has a
//! no-op default, so implementers override only what they display.

use helm_domain::{ReflectionDecision, ToolEvent, TurnBranch, TurnState};

pub trait TurnProgressNotifier: Send + Sync {
    /// Called when the state machine enters a state
    fn on_state_change(&self, _state: TurnState, _iteration: usize, _max_iterations: usize) {}

    /// Called when the utterance was rewritten
    fn on_interpretation(&self, _kind: &str, _text: &str) {}

    /// Called when a consensus round finishes
    ///
    /// # Arguments
    /// * `purpose` - What was voted on (e.g., "selection", "decision")
    /// * `winner` - Display form of the chosen sample, if any
    fn on_consensus(&self, _purpose: &str, _winner: Option<&str>, _matches: usize, _queries: usize) {}

    /// Called before a retry attempt
    fn on_retry(&self, _purpose: &str, _attempt: usize, _reason: &str) {}

    /// Called when a tool is about to be invoked
    fn on_tool_call(&self, _tool_name: &str, _args: &str) {}

    /// Called for each progress checkpoint reported by a running tool
    fn on_tool_progress(&self, _tool_name: &str, _message: &str) {}

    /// Called when a tool event has been recorded
    fn on_tool_result(&self, _event: &ToolEvent) {}

    /// Called when reflection reaches a decision
    fn on_reflection(&self, _decision: &ReflectionDecision) {}

    /// Called once the turn produced its output
    fn on_turn_complete(&self, _branch: TurnBranch, _iterations: usize) {}
}

/// No-op implementation for when progress isn't needed
pub struct NoTurnProgress;

impl TurnProgressNotifier for NoTurnProgress {}
