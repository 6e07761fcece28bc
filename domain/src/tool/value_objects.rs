//! Tool domain value objects: what the tool boundary hands back

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw outcome of one tool call, before classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// Explicit error flag raised by the boundary
    #[serde(default)]
    pub is_error: bool,
    /// Structured fields, when the tool returned JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured: Option<Value>,
    /// Free-text segments in the order they were produced
    #[serde(default)]
    pub text: Vec<String>,
}

impl ToolOutcome {
    pub fn text(segment: impl Into<String>) -> Self {
        Self {
            text: vec![segment.into()],
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            text: vec![message.into()],
            ..Default::default()
        }
    }

    pub fn structured(value: Value) -> Self {
        Self {
            structured: Some(value),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, segment: impl Into<String>) -> Self {
        self.text.push(segment.into());
        self
    }

    /// Decide success.
    ///
    /// | Signal | Result |
    /// |--------|--------|
    /// | `is_error` set | failure |
    /// | `status` is `success`/`ok` | success |
    /// | `status` is `error`/`failure`/`failed` | failure |
    /// | boolean `success` field | that value |
    /// | anything else | success |
    pub fn classify(&self) -> bool {
        if self.is_error {
            return false;
        }
        let Some(Value::Object(fields)) = &self.structured else {
            return true;
        };
        if let Some(Value::String(status)) = fields.get("status") {
            match status.to_lowercase().as_str() {
                "success" | "ok" => return true,
                "error" | "failure" | "failed" => return false,
                _ => {}
            }
        }
        if let Some(Value::Bool(success)) = fields.get("success") {
            return *success;
        }
        true
    }

    /// Render the outcome as one block of text.
    ///
    /// Text segments win; otherwise a `message`/`error` field, otherwise the
    /// whole structured value.
    pub fn render(&self) -> String {
        let joined = self
            .text
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        if !joined.is_empty() {
            return joined;
        }
        match &self.structured {
            Some(Value::Object(fields)) => ["message", "error", "result"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(fields.clone()).to_string()),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}
