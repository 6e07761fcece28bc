//! Turn loop configuration from TOML (`[agent]` section)

use helm_application::ExecutionParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// max_iterations = 5
/// selection_max_queries = 7
/// selection_min_matches = 2
/// decision_max_queries = 3
/// decision_min_matches = 2
/// tool_timeout_seconds = 120
/// parallel_consensus = false
/// rewrite_queries = true
/// history_limit = 5
/// common_tools = ["lights_on", "lights_off"]
/// ```
///
/// The generation timeout lives in `[generation]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub max_iterations: usize,
    pub selection_max_queries: usize,
    pub selection_min_matches: usize,
    pub decision_max_queries: usize,
    pub decision_min_matches: usize,
    pub max_generation_attempts: usize,
    pub max_tool_call_attempts: usize,
    pub tool_timeout_seconds: u64,
    /// Issue consensus samples concurrently
    pub parallel_consensus: bool,
    /// Run the INTERPRET step before tool selection
    pub rewrite_queries: bool,
    /// Number of earlier turns kept in prompts
    pub history_limit: usize,
    /// Tools described in full in the selection prompt
    pub common_tools: Vec<String>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        let params = ExecutionParams::default();
        Self {
            max_iterations: params.max_iterations,
            selection_max_queries: params.selection_max_queries,
            selection_min_matches: params.selection_min_matches,
            decision_max_queries: params.decision_max_queries,
            decision_min_matches: params.decision_min_matches,
            max_generation_attempts: params.max_generation_attempts,
            max_tool_call_attempts: params.max_tool_call_attempts,
            tool_timeout_seconds: params.tool_timeout.as_secs(),
            parallel_consensus: params.parallel_consensus,
            rewrite_queries: params.rewrite_queries,
            history_limit: params.history_limit,
            common_tools: params.common_tools,
        }
    }
}

impl FileAgentConfig {
    /// Convert into execution parameters, taking the generation timeout
    /// from the `[generation]` section.
    pub fn to_execution_params(&self, generation_timeout_seconds: u64) -> ExecutionParams {
        ExecutionParams::default()
            .with_max_iterations(self.max_iterations)
            .with_selection_consensus(self.selection_max_queries, self.selection_min_matches)
            .with_decision_consensus(self.decision_max_queries, self.decision_min_matches)
            .with_max_generation_attempts(self.max_generation_attempts)
            .with_max_tool_call_attempts(self.max_tool_call_attempts)
            .with_generation_timeout(Duration::from_secs(generation_timeout_seconds))
            .with_tool_timeout(Duration::from_secs(self.tool_timeout_seconds))
            .with_parallel_consensus(self.parallel_consensus)
            .with_rewrite_queries(self.rewrite_queries)
            .with_history_limit(self.history_limit)
            .with_common_tools(self.common_tools.clone())
    }
}
