//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for turn results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Reply text with a short action summary
    Text,
    /// Reply text only
    Brief,
    /// The whole turn output as JSON
    Json,
}

/// CLI arguments for helm
#[derive(Parser, Debug)]
#[command(name = "helm")]
#[command(author, version, about = "Conversational agent that drives tools by sampled consensus")]
#[command(long_about = r#"
helm turns a request into tool calls on an external tool surface.

Each turn runs a small state machine:
1. Interpret: rewrite the request, answer directly, or ask back
2. Select tool: several sampled answers vote on the next tool
3. Execute: call the tool with retried argument generation
4. Reflect: continue, finish with a summary, or ask a question

Configuration files are loaded from (in priority order):
1. --config <path>                Explicit config file
2. ./helm.toml or ./.helm.toml    Project-level config
3. ~/.config/helm/config.toml     Global config

Example:
  helm "lower the landing gear and set flaps to 30"
  helm --chat -v
"#)]
pub struct Cli {
    /// The request to run (not required in chat mode)
    pub utterance: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Override the generator model
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Override the iteration ceiling per turn
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write operation logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Append turn events as JSONL to this file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_shot_args() {
        let cli = Cli::parse_from(["helm", "-vv", "--max-iterations", "3", "gear down"]);
        assert_eq!(cli.utterance.as_deref(), Some("gear down"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.max_iterations, Some(3));
        assert_eq!(cli.output, OutputFormat::Text);
        assert!(!cli.chat);
    }

    #[test]
    fn test_chat_args() {
        let cli = Cli::parse_from(["helm", "--chat", "-o", "json", "--config", "ops.toml"]);
        assert!(cli.chat);
        assert!(cli.utterance.is_none());
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("ops.toml")));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
