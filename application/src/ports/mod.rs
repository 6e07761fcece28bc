//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod conversation_logger;
pub mod progress;
pub mod status;
pub mod text_generator;
pub mod tool_boundary;
