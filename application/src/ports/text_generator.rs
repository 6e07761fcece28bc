//! Text generator port
//!
//! The remote generation service is opaque: a function of messages, an
//! optional restricted tool list and sampling overrides that may return
//! different text on every call.

use async_trait::async_trait;
use helm_domain::{GenerationResponse, Message, SamplingParams, ToolDefinition};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that can occur while generating
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Generation timed out")]
    Timeout,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Generation cancelled")]
    Cancelled,
}

impl GenerationError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GenerationError::Cancelled)
    }
}

/// One generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub messages: Vec<Message>,
    /// Callable tools; empty means plain text only
    pub tools: Vec<ToolDefinition>,
    pub sampling: SamplingParams,
}

impl GenerationRequest {
    pub fn new(messages: Vec<Message>, sampling: SamplingParams) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            sampling,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Last user message, if any.
    pub fn prompt(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == helm_domain::Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

/// Gateway to the text-generation service
///
/// Implementations live in the infrastructure layer and must return
/// [`GenerationError::Cancelled`] promptly once `cancel` fires.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationResponse, GenerationError>;
}
