//! Status read through a dedicated tool on the tool boundary.

use async_trait::async_trait;
use helm_application::{StatusReader, ToolBoundary};
use helm_domain::StatusSnapshot;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Calls `tool` with no arguments and turns its output into a snapshot.
///
/// Any failure yields no snapshot.
pub struct ToolStatusReader<T: ToolBoundary> {
    tools: Arc<T>,
    tool: String,
    timeout: Duration,
}

impl<T: ToolBoundary> ToolStatusReader<T> {
    pub fn new(tools: Arc<T>, tool: impl Into<String>, timeout: Duration) -> Self {
        Self {
            tools,
            tool: tool.into(),
            timeout,
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }
}

#[async_trait]
impl<T: ToolBoundary + 'static> StatusReader for ToolStatusReader<T> {
    async fn read_status(&self, cancel: &CancellationToken) -> Option<StatusSnapshot> {
        let outcome = match self
            .tools
            .call_tool(&self.tool, &BTreeMap::new(), self.timeout, &|_: &str| {}, cancel)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(tool = %self.tool, error = %e, "Status read failed");
                return None;
            }
        };

        if !outcome.classify() {
            debug!(tool = %self.tool, "Status tool reported a failure");
            return None;
        }

        match outcome.structured {
            Some(value) if outcome.text.is_empty() => Some(StatusSnapshot::Structured(value)),
            _ => StatusSnapshot::from_output(&outcome.render()),
        }
    }
}
