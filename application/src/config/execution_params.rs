//! Execution parameters: turn loop control.
//!
//! [`ExecutionParams`] groups the static parameters that control the turn
//! loop in [`RunTurnUseCase`](crate::use_cases::run_turn::RunTurnUseCase):
//! iteration ceiling, consensus budgets, retry budgets and timeouts.

use helm_domain::{ConsensusConfig, MatchMode, stop_on_newline};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Turn loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Maximum select/execute/reflect iterations per turn.
    pub max_iterations: usize,
    /// Sample budget for tool selection.
    pub selection_max_queries: usize,
    /// Agreeing samples that end tool selection early.
    pub selection_min_matches: usize,
    /// Sample budget for the continue/done/ask decision.
    pub decision_max_queries: usize,
    /// Agreeing samples that end the decision early.
    pub decision_min_matches: usize,
    /// Attempts for single (non-consensus) generation calls.
    pub max_generation_attempts: usize,
    /// Attempts to obtain a structured tool call.
    pub max_tool_call_attempts: usize,
    /// Ceiling for each generation call.
    pub generation_timeout: Duration,
    /// Ceiling for each tool call.
    pub tool_timeout: Duration,
    /// Issue consensus samples concurrently.
    pub parallel_consensus: bool,
    /// Run the INTERPRET rewrite step.
    pub rewrite_queries: bool,
    /// Past turns kept in prompts.
    pub history_limit: usize,
    /// Tools described in full in the selection prompt.
    pub common_tools: Vec<String>,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            selection_max_queries: 7,
            selection_min_matches: 2,
            decision_max_queries: 3,
            decision_min_matches: 2,
            max_generation_attempts: 3,
            max_tool_call_attempts: 3,
            generation_timeout: Duration::from_secs(30),
            tool_timeout: Duration::from_secs(120),
            parallel_consensus: false,
            rewrite_queries: true,
            history_limit: 5,
            common_tools: Vec::new(),
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_selection_consensus(mut self, max_queries: usize, min_matches: usize) -> Self {
        self.selection_max_queries = max_queries;
        self.selection_min_matches = min_matches;
        self
    }

    pub fn with_decision_consensus(mut self, max_queries: usize, min_matches: usize) -> Self {
        self.decision_max_queries = max_queries;
        self.decision_min_matches = min_matches;
        self
    }

    pub fn with_max_generation_attempts(mut self, attempts: usize) -> Self {
        self.max_generation_attempts = attempts;
        self
    }

    pub fn with_max_tool_call_attempts(mut self, attempts: usize) -> Self {
        self.max_tool_call_attempts = attempts;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_parallel_consensus(mut self, parallel: bool) -> Self {
        self.parallel_consensus = parallel;
        self
    }

    pub fn with_rewrite_queries(mut self, rewrite: bool) -> Self {
        self.rewrite_queries = rewrite;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_common_tools(mut self, tools: Vec<String>) -> Self {
        self.common_tools = tools;
        self
    }

    // ==================== Derived Configs ====================

    /// Consensus settings for tool selection. Questions only need to agree
    /// in kind, so samples compare by equivalence.
    pub fn selection_consensus(&self) -> ConsensusConfig {
        ConsensusConfig::new(self.selection_max_queries, self.selection_min_matches)
            .with_match_mode(MatchMode::Some)
            .with_parallel(self.parallel_consensus)
    }

    /// Consensus settings for the single-word decision.
    pub fn decision_consensus(&self) -> ConsensusConfig {
        ConsensusConfig::new(self.decision_max_queries, self.decision_min_matches)
            .with_match_mode(MatchMode::Exact)
            .with_stop(stop_on_newline())
            .with_parallel(self.parallel_consensus)
    }
}
