//! Argument normalization
//!
//! Generators pad tool calls with nulls, empty strings, template
//! placeholders and numbers-as-strings. Everything is cleaned here before
//! the call crosses the tool boundary.

use super::entities::ToolDefinition;
use serde_json::{Number, Value};
use std::collections::{BTreeMap, HashMap};

const PLACEHOLDER_WORDS: &[&str] = &["null", "none", "undefined", "n/a", "nil", "...", "tbd"];

/// Normalize raw generator arguments against a tool definition.
///
/// - keys not declared by the tool are dropped
/// - null, empty and placeholder values are dropped
/// - numeric strings become numbers unless the parameter is a string
/// - `"true"`/`"false"` become booleans for boolean parameters
pub fn normalize_arguments(
    tool: &ToolDefinition,
    raw: &HashMap<String, Value>,
) -> BTreeMap<String, Value> {
    let mut normalized = BTreeMap::new();
    for (key, value) in raw {
        let Some(param) = tool.parameter(key) else {
            continue;
        };
        if is_blank(value) {
            continue;
        }
        let value = match value {
            Value::String(s) => {
                let trimmed = s.trim();
                if param.is_boolean() {
                    coerce_bool(trimmed).unwrap_or_else(|| Value::String(trimmed.to_string()))
                } else if param.is_string() {
                    Value::String(trimmed.to_string())
                } else {
                    coerce_number(trimmed).unwrap_or_else(|| Value::String(trimmed.to_string()))
                }
            }
            other => other.clone(),
        };
        normalized.insert(key.clone(), value);
    }
    normalized
}

/// Whether a value carries no information.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => is_placeholder(s),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

fn is_placeholder(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_lowercase();
    if PLACEHOLDER_WORDS.contains(&lower.as_str()) {
        return true;
    }
    let wrapped = |open: &str, close: char| {
        trimmed.len() > open.len() && trimmed.starts_with(open) && trimmed.ends_with(close)
    };
    wrapped("<", '>') || wrapped("${", '}') || (wrapped("{", '}') && !trimmed.contains(':'))
}

fn coerce_number(s: &str) -> Option<Value> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::Number(i.into()));
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn coerce_bool(s: &str) -> Option<Value> {
    match s.to_lowercase().as_str() {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => None,
    }
}
