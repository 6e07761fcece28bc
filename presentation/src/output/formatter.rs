//! Output formatter trait

use helm_domain::TurnOutput;

/// Trait for formatting turn outputs
pub trait OutputFormatter {
    /// Reply text with the executed tools and the outcome
    fn format(&self, output: &TurnOutput) -> String;

    /// Format as JSON
    fn format_json(&self, output: &TurnOutput) -> String;

    /// Reply text only
    fn format_brief(&self, output: &TurnOutput) -> String;
}
