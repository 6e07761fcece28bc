//! Configuration file loading for helm
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `HELM_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./helm.toml` or `./.helm.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/helm/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAgentConfig, FileConfig, FileGenerationConfig, FileLoggingConfig,
    FileStatusConfig, FileToolConfig, FileToolParameter,
};
pub use loader::ConfigLoader;
