//! Tool configuration from TOML (`[tools.<name>]` sections)
//!
//! Every entry registers one command-backed tool. The process receives the
//! call arguments as a JSON object on stdin, reports progress on stderr and
//! writes its result to stdout.
//!
//! ```toml
//! [tools.set_flaps]
//! description = "Set the flap angle"
//! tier = "common"
//! command = "flightctl"
//! args = ["flaps"]
//! aliases = ["flaps"]
//!
//! [tools.set_flaps.parameters.angle]
//! type = "number"
//! description = "Flap angle in degrees"
//! required = true
//! ```

use helm_domain::{ToolDefinition, ToolParameter, ToolTier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Defines a single parameter of a configured tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileToolParameter {
    /// Parameter type: "string", "number", "integer", "boolean"
    #[serde(rename = "type", default = "default_string_type")]
    pub param_type: String,
    pub description: String,
    /// Whether this parameter is required (default: false)
    #[serde(default)]
    pub required: bool,
}

fn default_string_type() -> String {
    "string".to_string()
}

/// Command-backed tool definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileToolConfig {
    pub description: String,
    /// "common" or "extended" (default)
    #[serde(default)]
    pub tier: ToolTier,
    /// Executable to run
    pub command: String,
    /// Fixed command-line arguments; call arguments go to stdin
    #[serde(default)]
    pub args: Vec<String>,
    /// Alternative names the selection parser accepts
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Working directory for the process
    #[serde(default)]
    pub working_dir: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, FileToolParameter>,
}

impl FileToolConfig {
    /// Build the domain definition. Parameters are ordered by name.
    pub fn to_definition(&self, name: &str) -> ToolDefinition {
        self.parameters.iter().fold(
            ToolDefinition::new(name, self.description.as_str(), self.tier),
            |definition, (param_name, param)| {
                definition.with_parameter(
                    ToolParameter::new(
                        param_name.as_str(),
                        param.description.as_str(),
                        param.required,
                    )
                    .with_type(param.param_type.as_str()),
                )
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tool() {
        let config: FileToolConfig = toml::from_str(
            r#"
description = "Set the flap angle"
tier = "common"
command = "flightctl"
args = ["flaps"]

[parameters.angle]
type = "number"
description = "Flap angle in degrees"
required = true

[parameters.note]
description = "Free text"
"#,
        )
        .unwrap();

        assert_eq!(config.tier, ToolTier::Common);
        assert_eq!(config.args, vec!["flaps".to_string()]);

        let definition = config.to_definition("set_flaps");
        assert_eq!(definition.name, "set_flaps");
        assert_eq!(definition.tier, ToolTier::Common);
        let angle = definition.parameter("angle").unwrap();
        assert!(angle.required);
        assert_eq!(angle.param_type, "number");
        let note = definition.parameter("note").unwrap();
        assert!(!note.required);
        assert!(note.is_string());
    }

    #[test]
    fn test_tier_defaults_to_extended() {
        let config: FileToolConfig =
            toml::from_str("description = \"Lower gear\"\ncommand = \"gear\"").unwrap();
        assert_eq!(config.tier, ToolTier::Extended);
        assert!(config.parameters.is_empty());
    }
}
