//! Turn entities: input, states, branches and output

use crate::tool::ToolEvent;
use serde::{Deserialize, Serialize};

/// Channel an utterance arrived on. Used for routing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputOrigin {
    #[default]
    Text,
    Voice,
    Api,
}

/// Immutable input of one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnInput {
    pub utterance: String,
    /// Previous assistant response, used to resolve follow-ups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response: Option<String>,
    #[serde(default)]
    pub origin: InputOrigin,
}

impl TurnInput {
    pub fn new(utterance: impl Into<String>) -> Self {
        Self {
            utterance: utterance.into(),
            previous_response: None,
            origin: InputOrigin::Text,
        }
    }

    pub fn with_previous_response(mut self, response: impl Into<String>) -> Self {
        self.previous_response = Some(response.into());
        self
    }

    pub fn with_origin(mut self, origin: InputOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Whether the previous response asked the user something.
    pub fn follows_question(&self) -> bool {
        self.previous_response
            .as_deref()
            .is_some_and(|r| r.trim_end().ends_with('?'))
    }
}

/// States of the turn machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Interpret,
    SelectTool,
    Execute,
    ReflectSummarize,
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnState::Interpret => "INTERPRET",
            TurnState::SelectTool => "SELECT_TOOL",
            TurnState::Execute => "EXECUTE",
            TurnState::ReflectSummarize => "REFLECT_SUMMARIZE",
        }
    }
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnBranch {
    Satisfied,
    MaxIterations,
    Ask,
    Error,
}

impl TurnBranch {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnBranch::Satisfied => "satisfied",
            TurnBranch::MaxIterations => "max_iterations",
            TurnBranch::Ask => "ask",
            TurnBranch::Error => "error",
        }
    }

    /// The turn is waiting on the user.
    pub fn needs_input(&self) -> bool {
        matches!(self, TurnBranch::Ask)
    }
}

impl std::fmt::Display for TurnBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal artifact of a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutput {
    /// Text shown to the user
    pub text: String,
    /// Short summary kept in history
    pub state_summary: String,
    pub branch: TurnBranch,
    /// Events of the iteration group, for display
    #[serde(default)]
    pub tool_results: Vec<ToolEvent>,
    pub iterations: usize,
}

impl TurnOutput {
    pub fn new(text: impl Into<String>, state_summary: impl Into<String>, branch: TurnBranch) -> Self {
        Self {
            text: text.into(),
            state_summary: state_summary.into(),
            branch,
            tool_results: Vec::new(),
            iterations: 0,
        }
    }

    pub fn with_events(mut self, events: Vec<ToolEvent>, iterations: usize) -> Self {
        self.tool_results = events;
        self.iterations = iterations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follows_question() {
        assert!(!TurnInput::new("kitchen").follows_question());
        assert!(
            TurnInput::new("kitchen")
                .with_previous_response("Which room? ")
                .follows_question()
        );
        assert!(
            !TurnInput::new("thanks")
                .with_previous_response("Lights are on.")
                .follows_question()
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(TurnState::ReflectSummarize.to_string(), "REFLECT_SUMMARIZE");
        assert_eq!(TurnBranch::MaxIterations.to_string(), "max_iterations");
        assert!(TurnBranch::Ask.needs_input());
    }

    #[test]
    fn test_branch_serialization() {
        let json = serde_json::to_string(&TurnBranch::MaxIterations).unwrap();
        assert_eq!(json, "\"max_iterations\"");
    }
}
