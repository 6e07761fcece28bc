//! JSON Schema tool converter.
//!
//! Produces the OpenAI-style `{"type": "function", ...}` entries sent with
//! a chat-completion request.

use helm_domain::ToolDefinition;
use serde_json::{Map, Value, json};

/// Converter from domain tool definitions to function schemas.
///
/// Handles param_type → JSON Schema type mapping:
/// - `"string"`, `"path"` → `"string"`
/// - `"number"` → `"number"`
/// - `"integer"` → `"integer"`
/// - `"boolean"` → `"boolean"`
/// - anything else → `"string"`
pub struct FunctionSchemaConverter;

impl FunctionSchemaConverter {
    pub fn tool_to_schema(tool: &ToolDefinition) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &tool.parameters {
            let schema_type = match param.param_type.as_str() {
                "string" | "path" => "string",
                "number" => "number",
                "integer" => "integer",
                "boolean" => "boolean",
                _ => "string",
            };

            properties.insert(
                param.name.clone(),
                json!({
                    "type": schema_type,
                    "description": param.description,
                }),
            );

            if param.required {
                required.push(json!(param.name));
            }
        }

        json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }
            }
        })
    }

    /// Schemas for a restricted tool list, sorted by name.
    pub fn tools_schema(tools: &[ToolDefinition]) -> Vec<Value> {
        let mut tools: Vec<&ToolDefinition> = tools.iter().collect();
        tools.sort_by_key(|t| &t.name);
        tools.into_iter().map(Self::tool_to_schema).collect()
    }
}
