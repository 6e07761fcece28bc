//! Tool boundary adapters
//!
//! - `command`: tools backed by external processes
//! - `schema`: function-calling schemas for the chat-completion API

pub mod command;
pub mod schema;

pub use command::CommandToolBoundary;
pub use schema::FunctionSchemaConverter;
