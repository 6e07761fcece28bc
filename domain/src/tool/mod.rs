//! Tool domain module
//!
//! How the agent sees the tool surface: definitions grouped by prompt
//! [`ToolTier`], structured [`ToolCall`]s coming out of the generator, raw
//! [`ToolOutcome`]s coming back from the boundary, and the [`ToolEvent`]
//! log entries recorded per iteration group.
//!
//! ```text
//! ToolSpec ──► ToolCall ──normalize_arguments──► boundary ──► ToolOutcome
//!                                                                │ classify
//!                                                                ▼
//!                                                            ToolEvent
//! ```

pub mod arguments;
pub mod entities;
pub mod event;
pub mod value_objects;

pub use arguments::normalize_arguments;
pub use entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec, ToolTier};
pub use event::ToolEvent;
pub use value_objects::ToolOutcome;
