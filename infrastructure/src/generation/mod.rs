//! Text generation adapters.
//!
//! [`OpenAiCompatibleGenerator`] implements the
//! [`TextGenerator`](helm_application::TextGenerator) port against any
//! server speaking the chat-completion protocol.

mod openai_compatible;

pub use openai_compatible::OpenAiCompatibleGenerator;
