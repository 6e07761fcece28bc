//! Domain layer for helm
//!
//! Pure types and logic of the agent's decision loop. No I/O lives here.
//!
//! # Core Concepts
//!
//! ## Consensus
//!
//! A generator is non-deterministic, so every decision that matters is
//! asked several times with varied [`SamplingParams`] and voted on
//! ([`ConsensusResult`], [`tally`]).
//!
//! ## Closed reply types
//!
//! Free text from the generator crosses into the rest of the system only
//! through parsers returning sum types: [`SelectionReply`],
//! [`DecisionWord`], [`Interpretation`]. Reflection produces a
//! [`ReflectionDecision`].
//!
//! ## Turn
//!
//! One utterance in, one [`TurnOutput`] out. [`TurnWorkingState`] holds
//! the per-turn mutable state and the append-only [`ToolEvent`] log.

pub mod core;
pub mod interpretation;
pub mod prompt;
pub mod quorum;
pub mod reflection;
pub mod sampling;
pub mod selection;
pub mod session;
pub mod status;
pub mod tool;
pub mod turn;

pub use core::{
    error::DomainError,
    ids::{GroupId, ToolEventId, TurnId},
    string::truncate,
};
pub use interpretation::{Interpretation, parse_interpretation};
pub use prompt::{ReflectionPrompt, SelectionPrompt, TurnPromptTemplate};
pub use quorum::{ConsensusConfig, ConsensusResult, MatchMode, samples_match, tally};
pub use reflection::{
    DecisionWord, ReflectionDecision, clean_follow_up, parse_decision_word, remaining_or_none,
};
pub use sampling::{SamplingParams, stop_on_newline};
pub use selection::{
    SelectionOutcome, SelectionReply, ToolSelection, is_completion_marker, parse_selection_reply,
};
pub use session::{GenerationResponse, Message, Role};
pub use status::{StatusSnapshot, status_prompt_text};
pub use tool::{
    ToolCall, ToolDefinition, ToolEvent, ToolOutcome, ToolParameter, ToolSpec, ToolTier,
    normalize_arguments,
};
pub use turn::{
    HistoryEntry, InputOrigin, TurnBranch, TurnHistory, TurnInput, TurnOutput, TurnState,
    TurnWorkingState,
};
