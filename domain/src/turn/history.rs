//! Cross-turn history
//!
//! Only trimmed text survives a turn. The history keeps the most recent
//! entries and counts the ones it dropped.

use super::entities::{TurnBranch, TurnOutput};
use crate::core::string::truncate;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const PROMPT_LEN: usize = 160;
const SUMMARY_LEN: usize = 200;

/// One past turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub prompt: String,
    /// `(tool name, success)` per executed tool
    pub tool_results: Vec<(String, bool)>,
    pub summary: String,
    pub branch: TurnBranch,
}

impl HistoryEntry {
    pub fn from_turn(prompt: &str, output: &TurnOutput) -> Self {
        Self {
            prompt: truncate(prompt.trim(), PROMPT_LEN),
            tool_results: output
                .tool_results
                .iter()
                .map(|e| (e.tool_name.clone(), e.success))
                .collect(),
            summary: truncate(output.text.trim(), SUMMARY_LEN),
            branch: output.branch,
        }
    }

    pub fn render(&self) -> String {
        let tools = if self.tool_results.is_empty() {
            "none".to_string()
        } else {
            self.tool_results
                .iter()
                .map(|(name, ok)| format!("{} {}", name, if *ok { "✓" } else { "✗" }))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "- user: {} | tools: {} | result ({}): {}",
            self.prompt, tools, self.branch, self.summary
        )
    }
}

/// Bounded, append-only turn history.
#[derive(Debug, Clone, Default)]
pub struct TurnHistory {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
    omitted: usize,
}

impl TurnHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
            omitted: 0,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
            self.omitted += 1;
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn omitted(&self) -> usize {
        self.omitted
    }

    /// Render for prompts.
    pub fn to_prompt_context(&self) -> String {
        if self.entries.is_empty() && self.omitted == 0 {
            return "(no earlier turns)".to_string();
        }
        let mut lines = Vec::with_capacity(self.entries.len() + 1);
        if self.omitted > 0 {
            lines.push(format!("({} earlier turns omitted)", self.omitted));
        }
        lines.extend(self.entries.iter().map(HistoryEntry::render));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(prompt: &str) -> HistoryEntry {
        HistoryEntry {
            prompt: prompt.to_string(),
            tool_results: vec![("lights_on".to_string(), true)],
            summary: "Lights are on.".to_string(),
            branch: TurnBranch::Satisfied,
        }
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(TurnHistory::new(3).to_prompt_context(), "(no earlier turns)");
    }

    #[test]
    fn test_cap_and_omitted_count() {
        let mut history = TurnHistory::new(2);
        for i in 0..5 {
            history.push(entry(&format!("turn {i}")));
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.omitted(), 3);

        let context = history.to_prompt_context();
        assert!(context.starts_with("(3 earlier turns omitted)"));
        assert!(context.contains("turn 4"));
        assert!(!context.contains("turn 1"));
    }

    #[test]
    fn test_zero_limit_keeps_count_only() {
        let mut history = TurnHistory::new(0);
        history.push(entry("a"));
        assert!(history.is_empty());
        assert_eq!(history.to_prompt_context(), "(1 earlier turns omitted)");
    }

    #[test]
    fn test_from_turn() {
        let output = TurnOutput::new("Done: lights on", "Completed lights_on", TurnBranch::Satisfied);
        let entry = HistoryEntry::from_turn("  turn on the lights ", &output);
        assert_eq!(entry.prompt, "turn on the lights");
        assert!(entry.tool_results.is_empty());
        assert!(entry.render().contains("tools: none"));
        assert!(entry.render().contains("(satisfied)"));
    }
}
