//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Prompt tier of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolTier {
    /// Frequently used; described in full when choosing the next tool
    Common,
    /// Listed by name only to keep the selection prompt bounded
    #[default]
    Extended,
}

impl ToolTier {
    pub fn as_str(&self) -> &str {
        match self {
            ToolTier::Common => "common",
            ToolTier::Extended => "extended",
        }
    }

    pub fn is_common(&self) -> bool {
        matches!(self, ToolTier::Common)
    }
}

impl std::fmt::Display for ToolTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Definition of a tool exposed by the tool boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique identifier (e.g., "lights_on")
    pub name: String,
    /// Human-readable description
    pub description: String,
    #[serde(default)]
    pub tier: ToolTier,
    /// Parameter specifications
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub required: bool,
    /// Type hint (e.g., "string", "number", "integer", "boolean")
    #[serde(default = "default_param_type")]
    pub param_type: String,
}

fn default_param_type() -> String {
    "string".to_string()
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, tier: ToolTier) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tier,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// One line per parameter, for prompts.
    pub fn parameter_lines(&self) -> Vec<String> {
        self.parameters
            .iter()
            .map(|p| {
                format!(
                    "- {} ({}{}): {}",
                    p.name,
                    p.param_type,
                    if p.required { ", required" } else { "" },
                    p.description
                )
            })
            .collect()
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: default_param_type(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }

    pub fn is_string(&self) -> bool {
        self.param_type == "string"
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.param_type.as_str(), "boolean" | "bool")
    }
}

/// Registry of available tools
///
/// Tools are kept in name order so prompts render deterministically.
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: BTreeMap<String, ToolDefinition>,
    /// Alias → canonical name mapping (e.g. "lights" → "lights_on")
    aliases: HashMap<String, String>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, tool: ToolDefinition) -> Self {
        self.tools.insert(tool.name.clone(), tool);
        self
    }

    pub fn register_alias(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), canonical.into());
        self
    }

    /// Resolve a name: canonical names first, then aliases
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.tools.contains_key(name) {
            Some(name)
        } else {
            self.aliases.get(name).map(|s| s.as_str())
        }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
    }

    pub fn common_tools(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values().filter(|t| t.tier.is_common())
    }

    pub fn extended_tools(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values().filter(|t| !t.tier.is_common())
    }

    /// Promote the named tools to the common tier.
    pub fn promote(mut self, names: &[String]) -> Self {
        for name in names {
            if let Some(tool) = self.tools.get_mut(name) {
                tool.tier = ToolTier::Common;
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// A structured call emitted by the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_name: String,
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}
