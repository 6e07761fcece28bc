//! Tool boundary port
//!
//! Invokes tools on the external tool surface. Long operations report
//! free-text progress checkpoints; every call honours a hard timeout and a
//! cancellation token.

use async_trait::async_trait;
use helm_domain::{ToolDefinition, ToolOutcome, ToolSpec};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Transport-level failures of the tool boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolBoundaryError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool '{tool}' timed out after {seconds}s")]
    Timeout { tool: String, seconds: u64 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Tool call cancelled")]
    Cancelled,
}

impl ToolBoundaryError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ToolBoundaryError::Cancelled)
    }
}

/// Callback receiving progress checkpoints
pub type ProgressFn<'a> = &'a (dyn Fn(&str) + Send + Sync);

#[async_trait]
pub trait ToolBoundary: Send + Sync {
    /// Definitions of every tool this boundary exposes
    fn tool_spec(&self) -> &ToolSpec;

    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().contains(name)
    }

    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get(name)
    }

    /// Call a tool. `timeout` bounds the total call time; progress does
    /// not extend it.
    async fn call_tool(
        &self,
        name: &str,
        arguments: &BTreeMap<String, Value>,
        timeout: Duration,
        progress: ProgressFn<'_>,
        cancel: &CancellationToken,
    ) -> Result<ToolOutcome, ToolBoundaryError>;
}
