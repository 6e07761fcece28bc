//! Application layer for helm
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    progress::{NoTurnProgress, TurnProgressNotifier},
    status::{NoStatus, StatusReader},
    text_generator::{GenerationError, GenerationRequest, TextGenerator},
    tool_boundary::{ProgressFn, ToolBoundary, ToolBoundaryError},
};
pub use use_cases::consensus::run_with_consensus;
pub use use_cases::retry::{Retry, RetryOutcome, Retryable};
pub use use_cases::run_turn::{RunTurnError, RunTurnUseCase};
