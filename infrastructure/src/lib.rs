//! Infrastructure layer for helm
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the chat-completion generator, command-backed
//! tools, the tool-backed status reader, the JSONL turn log and
//! configuration file loading.

pub mod config;
pub mod generation;
pub mod logging;
pub mod status;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentConfig, FileConfig, FileGenerationConfig,
    FileLoggingConfig, FileStatusConfig, FileToolConfig, FileToolParameter,
};
pub use generation::OpenAiCompatibleGenerator;
pub use logging::JsonlConversationLogger;
pub use status::ToolStatusReader;
pub use tools::{CommandToolBoundary, FunctionSchemaConverter};
