//! Interactive chat module
//!
//! Provides a line-editor based chat interface that runs one turn per
//! request and threads history between turns.

mod repl;

pub use repl::ChatRepl;
