//! ToolEvent: the append-only record of one tool invocation

use crate::core::ids::{GroupId, ToolEventId};
use crate::core::string::truncate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Maximum result length kept in a short summary.
pub const SUMMARY_RESULT_LEN: usize = 120;
/// Maximum error length shown to the generator.
pub const PROMPT_ERROR_LEN: usize = 160;
/// Maximum result length shown to the generator.
pub const PROMPT_RESULT_LEN: usize = 400;

/// Record of one tool invocation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEvent {
    pub id: ToolEventId,
    pub group_id: GroupId,
    pub tool_name: String,
    pub arguments: BTreeMap<String, Value>,
    /// Free-text result (or error text on failure)
    pub result: String,
    pub success: bool,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl ToolEvent {
    pub fn marker(&self) -> &'static str {
        if self.success { "✓" } else { "✗" }
    }

    /// `name(key=value, ...)`
    pub fn call_signature(&self) -> String {
        let args = self
            .arguments
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}={}", k, s),
                other => format!("{}={}", k, other),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.tool_name, args)
    }

    /// One line for history and execution prompts.
    pub fn short_summary(&self) -> String {
        format!(
            "{} {}: {}",
            self.marker(),
            self.tool_name,
            truncate(self.result.trim(), SUMMARY_RESULT_LEN)
        )
    }

    /// One line for selection and reflection prompts. Error bodies are
    /// shortened harder than results.
    pub fn prompt_line(&self) -> String {
        let limit = if self.success {
            PROMPT_RESULT_LEN
        } else {
            PROMPT_ERROR_LEN
        };
        let body = truncate(self.result.trim(), limit);
        if self.success {
            format!("{} {} -> {}", self.marker(), self.call_signature(), body)
        } else {
            format!("{} {} -> error: {}", self.marker(), self.call_signature(), body)
        }
    }
}
