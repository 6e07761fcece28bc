//! Console output formatter for turn outputs

use crate::cli::commands::OutputFormat;
use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use helm_domain::{TurnBranch, TurnOutput};

/// Formats turn outputs for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render in the requested format
    pub fn render(output: &TurnOutput, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => Self::format(output),
            OutputFormat::Brief => Self::format_brief(output),
            OutputFormat::Json => Self::format_json(output),
        }
    }

    /// Reply text followed by a compact list of executed tools
    pub fn format(output: &TurnOutput) -> String {
        let mut text = String::new();

        text.push_str(&Self::format_brief(output));

        if !output.tool_results.is_empty() {
            text.push_str(&Self::section_header("Actions"));
            for event in &output.tool_results {
                let marker = if event.success {
                    event.marker().green()
                } else {
                    event.marker().red()
                };
                text.push_str(&format!("  {} {}\n", marker, event.call_signature()));
            }
        }

        let steps = match output.iterations {
            1 => "1 step".to_string(),
            n => format!("{} steps", n),
        };
        text.push_str(&format!(
            "\n{}\n",
            format!("[{} · {}]", Self::branch_label(output.branch), steps).dimmed()
        ));

        text
    }

    /// Format as JSON
    pub fn format_json(output: &TurnOutput) -> String {
        serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
    }

    /// Reply text only, coloured by how the turn ended
    pub fn format_brief(output: &TurnOutput) -> String {
        let body = output.text.trim();
        let body = match output.branch {
            TurnBranch::Satisfied => body.normal(),
            TurnBranch::Ask => body.cyan(),
            TurnBranch::MaxIterations => body.yellow(),
            TurnBranch::Error => body.red(),
        };
        format!("{}\n", body)
    }

    fn branch_label(branch: TurnBranch) -> &'static str {
        match branch {
            TurnBranch::Satisfied => "done",
            TurnBranch::MaxIterations => "step limit reached",
            TurnBranch::Ask => "waiting for you",
            TurnBranch::Error => "failed",
        }
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", title.cyan().bold())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, output: &TurnOutput) -> String {
        Self::format(output)
    }

    fn format_json(&self, output: &TurnOutput) -> String {
        Self::format_json(output)
    }

    fn format_brief(&self, output: &TurnOutput) -> String {
        Self::format_brief(output)
    }
}
