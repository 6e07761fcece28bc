//! Tool selection
//!
//! A selection round asks the generator "which single tool should run
//! next" several times and votes on the parsed replies.

pub mod parsing;

pub use parsing::{SelectionReply, is_completion_marker, parse_selection_reply};

use crate::quorum::ConsensusResult;
use serde::{Deserialize, Serialize};

/// What a selection round decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SelectionOutcome {
    Tool(String),
    Done,
    Question(String),
    /// No usable sample at all
    NoConsensus,
}

/// Result of a selection round with its voting statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSelection {
    pub outcome: SelectionOutcome,
    /// Usable samples collected
    pub sample_count: usize,
    /// Samples agreeing with the outcome
    pub agreement: usize,
    pub queries_run: usize,
}

impl ToolSelection {
    pub fn from_consensus(consensus: &ConsensusResult<SelectionReply>) -> Self {
        let outcome = match &consensus.result {
            Some(SelectionReply::Tool(name)) => SelectionOutcome::Tool(name.clone()),
            Some(SelectionReply::Done) => SelectionOutcome::Done,
            Some(SelectionReply::Question(q)) => SelectionOutcome::Question(q.clone()),
            Some(SelectionReply::Empty) | None => SelectionOutcome::NoConsensus,
        };
        Self {
            outcome,
            sample_count: consensus.sample_count(),
            agreement: consensus.match_count,
            queries_run: consensus.queries_run,
        }
    }

    pub fn tool(&self) -> Option<&str> {
        match &self.outcome {
            SelectionOutcome::Tool(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.outcome, SelectionOutcome::Done)
    }

    pub fn question(&self) -> Option<&str> {
        match &self.outcome {
            SelectionOutcome::Question(q) => Some(q),
            _ => None,
        }
    }

    /// "No tool" reached with at least `min_matches` agreeing samples.
    pub fn is_confident_done(&self, min_matches: usize) -> bool {
        self.is_done() && self.agreement >= min_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consensus(samples: Vec<SelectionReply>) -> ConsensusResult<SelectionReply> {
        let queries = samples.len();
        ConsensusResult::from_samples(samples, queries, |a, b| a.is_equivalent(b))
    }

    #[test]
    fn test_majority_tool() {
        let selection = ToolSelection::from_consensus(&consensus(vec![
            SelectionReply::Tool("circularize_orbit".to_string()),
            SelectionReply::Done,
            SelectionReply::Tool("circularize_orbit".to_string()),
        ]));
        assert_eq!(selection.tool(), Some("circularize_orbit"));
        assert_eq!(selection.agreement, 2);
        assert_eq!(selection.sample_count, 3);
        assert!(!selection.is_done());
    }

    #[test]
    fn test_confident_done() {
        let selection = ToolSelection::from_consensus(&consensus(vec![
            SelectionReply::Done,
            SelectionReply::Done,
        ]));
        assert!(selection.is_confident_done(2));
        assert!(!selection.is_confident_done(3));
    }

    #[test]
    fn test_questions_agree_regardless_of_content() {
        let selection = ToolSelection::from_consensus(&consensus(vec![
            SelectionReply::Question("Which room?".to_string()),
            SelectionReply::Question("Kitchen or hall?".to_string()),
        ]));
        assert_eq!(selection.question(), Some("Which room?"));
        assert_eq!(selection.agreement, 2);
    }

    #[test]
    fn test_no_samples() {
        let selection = ToolSelection::from_consensus(&ConsensusResult::empty(7));
        assert_eq!(selection.outcome, SelectionOutcome::NoConsensus);
        assert_eq!(selection.queries_run, 7);
    }
}
