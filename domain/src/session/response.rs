//! Generator replies

use crate::tool::ToolCall;
use serde::{Deserialize, Serialize};

/// What one generation call produced: free text and zero or more
/// structured tool calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
    #[serde(default)]
    pub calls: Vec<ToolCall>,
}

impl GenerationResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            calls: Vec::new(),
        }
    }

    pub fn with_call(mut self, call: ToolCall) -> Self {
        self.calls.push(call);
        self
    }

    pub fn has_calls(&self) -> bool {
        !self.calls.is_empty()
    }

    /// First structured call targeting `name`.
    pub fn call_for(&self, name: &str) -> Option<&ToolCall> {
        self.calls.iter().find(|c| c.tool_name == name)
    }

    /// Trimmed text, `None` when blank.
    pub fn non_empty_text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_for() {
        let response = GenerationResponse::from_text("")
            .with_call(ToolCall::new("lights_off"))
            .with_call(ToolCall::new("lights_on").with_arg("room", "kitchen"));
        assert!(response.has_calls());
        assert_eq!(
            response.call_for("lights_on").and_then(|c| c.get_string("room")),
            Some("kitchen")
        );
        assert!(response.call_for("warp").is_none());
    }

    #[test]
    fn test_non_empty_text() {
        assert_eq!(GenerationResponse::from_text("  hi ").non_empty_text(), Some("hi"));
        assert_eq!(GenerationResponse::from_text(" \n").non_empty_text(), None);
    }
}
