//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agent;
mod generation;
mod logging;
mod status;
mod tools;

pub use agent::FileAgentConfig;
pub use generation::FileGenerationConfig;
pub use logging::FileLoggingConfig;
pub use status::FileStatusConfig;
pub use tools::{FileToolConfig, FileToolParameter};

use helm_application::ExecutionParams;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    ZeroTimeout(&'static str),

    #[error("model name cannot be empty")]
    EmptyModelName,

    #[error("agent.max_iterations cannot be 0")]
    ZeroIterations,

    #[error("{section} consensus: {reason}")]
    InvalidConsensus {
        section: &'static str,
        reason: String,
    },

    #[error("tool '{0}' has an empty command")]
    EmptyCommand(String),

    #[error("status tool '{0}' is not a configured tool")]
    UnknownStatusTool(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Chat-completion endpoint settings
    pub generation: FileGenerationConfig,
    /// Turn loop settings
    pub agent: FileAgentConfig,
    /// Command-backed tools, keyed by tool name
    pub tools: BTreeMap<String, FileToolConfig>,
    /// Optional status reader tool
    pub status: FileStatusConfig,
    /// Log destinations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.generation.timeout_seconds == 0 {
            return Err(ConfigValidationError::ZeroTimeout(
                "generation.timeout_seconds",
            ));
        }
        if self.agent.tool_timeout_seconds == 0 {
            return Err(ConfigValidationError::ZeroTimeout(
                "agent.tool_timeout_seconds",
            ));
        }
        if self.generation.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if self.agent.max_iterations == 0 {
            return Err(ConfigValidationError::ZeroIterations);
        }

        let params = self.execution_params();
        for (section, consensus) in [
            ("selection", params.selection_consensus()),
            ("decision", params.decision_consensus()),
        ] {
            consensus
                .validate()
                .map_err(|e| ConfigValidationError::InvalidConsensus {
                    section,
                    reason: e.to_string(),
                })?;
        }

        if let Some((name, _)) = self
            .tools
            .iter()
            .find(|(_, tool)| tool.command.trim().is_empty())
        {
            return Err(ConfigValidationError::EmptyCommand(name.clone()));
        }
        if let Some(tool) = &self.status.tool
            && !self.tools.contains_key(tool)
        {
            return Err(ConfigValidationError::UnknownStatusTool(tool.clone()));
        }

        Ok(())
    }

    /// Turn loop parameters for the application layer.
    pub fn execution_params(&self) -> ExecutionParams {
        self.agent
            .to_execution_params(self.generation.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[generation]
base_url = "https://api.example.com/v1"
model = "gpt-4o-mini"
api_key_env = "EXAMPLE_KEY"
timeout_seconds = 20

[agent]
max_iterations = 4
selection_max_queries = 5
selection_min_matches = 3
common_tools = ["lights_on"]

[tools.lights_on]
description = "Turn on the lights"
tier = "common"
command = "lightctl"
args = ["on"]

[tools.lights_on.parameters.room]
description = "Room name"

[tools.read_status]
description = "Read the house status"
command = "lightctl"
args = ["status"]

[status]
tool = "read_status"

[logging]
conversation_log = "/tmp/helm.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(config.agent.max_iterations, 4);
        assert_eq!(config.tools.len(), 2);
        assert_eq!(config.status.tool.as_deref(), Some("read_status"));
        assert!(config.logging.conversation_log.is_some());
        assert!(config.validate().is_ok());

        let params = config.execution_params();
        assert_eq!(params.selection_max_queries, 5);
        assert_eq!(params.selection_min_matches, 3);
        assert_eq!(params.generation_timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[agent]\nmax_iterations = 9\n").unwrap();
        assert_eq!(config.agent.max_iterations, 9);
        // Defaults should apply
        assert_eq!(config.generation, FileGenerationConfig::default());
        assert!(config.tools.is_empty());
        assert!(config.status.tool.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = FileConfig::default();
        config.generation.timeout_seconds = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroTimeout("generation.timeout_seconds"))
        );

        let mut config = FileConfig::default();
        config.agent.tool_timeout_seconds = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::ZeroTimeout(_))
        ));
    }

    #[test]
    fn test_validate_empty_model() {
        let mut config = FileConfig::default();
        config.generation.model = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyModelName));
    }

    #[test]
    fn test_validate_zero_iterations() {
        let mut config = FileConfig::default();
        config.agent.max_iterations = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroIterations));
    }

    #[test]
    fn test_validate_matches_above_queries() {
        let mut config = FileConfig::default();
        config.agent.decision_max_queries = 2;
        config.agent.decision_min_matches = 3;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigValidationError::InvalidConsensus {
                section: "decision",
                ..
            }
        ));
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_validate_unknown_status_tool() {
        let mut config = FileConfig::default();
        config.status.tool = Some("sensor".to_string());
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::UnknownStatusTool("sensor".to_string()))
        );
    }
}
