//! Messages exchanged with the text generator

pub mod entities;
pub mod response;

pub use entities::{Message, Role};
pub use response::GenerationResponse;
