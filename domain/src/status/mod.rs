//! External status snapshots
//!
//! Status is read-only context (vehicle telemetry, device state, ...) shown
//! to the generator before selection and reflection. It is best effort:
//! every consumer accepts an absent snapshot.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::string::truncate;

/// Maximum rendered status length in prompts.
pub const STATUS_PROMPT_LEN: usize = 1200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum StatusSnapshot {
    Text(String),
    Structured(Value),
}

impl StatusSnapshot {
    /// Build from tool output: JSON objects and arrays stay structured.
    pub fn from_output(output: &str) -> Option<Self> {
        let trimmed = output.trim();
        if trimmed.is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(Self::Structured(value)),
            _ => Some(Self::Text(trimmed.to_string())),
        }
    }

    pub fn to_prompt_text(&self) -> String {
        let raw = match self {
            StatusSnapshot::Text(text) => text.clone(),
            StatusSnapshot::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        };
        truncate(&raw, STATUS_PROMPT_LEN)
    }
}

/// Render an optional snapshot; absent status renders as a placeholder.
pub fn status_prompt_text(snapshot: Option<&StatusSnapshot>) -> String {
    snapshot
        .map(StatusSnapshot::to_prompt_text)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "(no status available)".to_string())
}
