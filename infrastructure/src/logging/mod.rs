//! Turn transcript logging.
//!
//! [`JsonlConversationLogger`] appends one JSON object per turn event and
//! implements the [`ConversationLogger`](helm_application::ConversationLogger)
//! port.

mod jsonl_logger;

pub use jsonl_logger::JsonlConversationLogger;
