//! Mutable per-turn state owned by the turn driver

use crate::core::error::DomainError;
use crate::core::ids::{GroupId, TurnId};
use crate::core::string::truncate;
use crate::selection::ToolSelection;
use crate::status::StatusSnapshot;
use crate::tool::ToolEvent;

/// Length of each result excerpt in a state summary.
const SUMMARY_EXCERPT_LEN: usize = 100;

/// State threaded through one turn.
///
/// Created fresh per turn and dropped at its end. The event log is
/// append-only; the original query is fixed once acting begins.
#[derive(Debug, Clone)]
pub struct TurnWorkingState {
    pub turn_id: TurnId,
    pub group_id: GroupId,
    iteration: usize,
    max_iterations: usize,
    original_query: String,
    /// Part of the goal not yet satisfied
    pub remaining_query: String,
    /// Tool chosen for the next execution
    pub current_tool: Option<String>,
    events: Vec<ToolEvent>,
    failed_tools: Vec<String>,
    status: Option<StatusSnapshot>,
    /// Most recent selection round, consulted by reflection
    pub last_selection: Option<ToolSelection>,
    acting: bool,
}

impl TurnWorkingState {
    pub fn new(
        turn_id: TurnId,
        group_id: GroupId,
        query: impl Into<String>,
        max_iterations: usize,
    ) -> Self {
        let query = query.into();
        Self {
            turn_id,
            group_id,
            iteration: 0,
            max_iterations,
            remaining_query: query.clone(),
            original_query: query,
            current_tool: None,
            events: Vec::new(),
            failed_tools: Vec::new(),
            status: None,
            last_selection: None,
            acting: false,
        }
    }

    /// Replace the query with its interpreted form. Only allowed before the
    /// first iteration.
    pub fn adopt_query(&mut self, query: impl Into<String>) -> Result<(), DomainError> {
        if self.acting {
            return Err(DomainError::QueryLocked);
        }
        let query = query.into();
        self.remaining_query = query.clone();
        self.original_query = query;
        Ok(())
    }

    /// Count a new iteration. Returns `false` when the ceiling is reached.
    pub fn begin_iteration(&mut self) -> bool {
        if self.iteration >= self.max_iterations {
            return false;
        }
        self.iteration += 1;
        self.acting = true;
        true
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn original_query(&self) -> &str {
        &self.original_query
    }

    pub fn events(&self) -> &[ToolEvent] {
        &self.events
    }

    pub fn last_event(&self) -> Option<&ToolEvent> {
        self.events.last()
    }

    /// Most recent failed event in the group.
    pub fn last_failure(&self) -> Option<&ToolEvent> {
        self.events.iter().rev().find(|e| !e.success)
    }

    pub fn failed_tools(&self) -> &[String] {
        &self.failed_tools
    }

    /// Append an event. Tool calls may change the outside world, so the
    /// cached status is dropped.
    pub fn record_event(&mut self, event: ToolEvent) {
        if event.success {
            self.failed_tools.retain(|t| t != &event.tool_name);
        } else if !self.failed_tools.contains(&event.tool_name) {
            self.failed_tools.push(event.tool_name.clone());
        }
        self.current_tool = None;
        self.status = None;
        self.events.push(event);
    }

    pub fn status(&self) -> Option<&StatusSnapshot> {
        self.status.as_ref()
    }

    pub fn has_cached_status(&self) -> bool {
        self.status.is_some()
    }

    pub fn cache_status(&mut self, status: Option<StatusSnapshot>) {
        self.status = status;
    }

    /// Summary of what was accomplished, built only from successful
    /// events. Never empty.
    pub fn state_summary(&self) -> String {
        let done: Vec<String> = self
            .events
            .iter()
            .filter(|e| e.success)
            .map(|e| format!("{}: {}", e.tool_name, truncate(e.result.trim(), SUMMARY_EXCERPT_LEN)))
            .collect();
        if done.is_empty() {
            "No actions completed.".to_string()
        } else {
            format!("Completed {}", done.join("; "))
        }
    }
}
