//! Shared utilities for use cases.
//!
//! Cancellation checks and the bounded generator wrapper used by every
//! step of the turn loop.

use crate::ports::text_generator::{GenerationError, GenerationRequest, TextGenerator};
use crate::use_cases::run_turn::RunTurnError;
use helm_domain::{GenerationResponse, Message, SamplingParams, ToolDefinition, TurnPromptTemplate};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Check if cancellation has been requested.
pub(crate) fn check_cancelled(token: &CancellationToken) -> Result<(), RunTurnError> {
    if token.is_cancelled() {
        return Err(RunTurnError::Cancelled);
    }
    Ok(())
}

/// Generator call with a hard timeout and cancellation.
///
/// A timed-out call surfaces as [`GenerationError::Timeout`], which the
/// consensus and retry engines treat as a missing sample.
pub(crate) struct BoundedGenerator<'a, G: TextGenerator + ?Sized> {
    generator: &'a G,
    timeout: Duration,
    cancel: &'a CancellationToken,
}

impl<'a, G: TextGenerator + ?Sized> BoundedGenerator<'a, G> {
    pub(crate) fn new(generator: &'a G, timeout: Duration, cancel: &'a CancellationToken) -> Self {
        Self {
            generator,
            timeout,
            cancel,
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) async fn generate(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
        sampling: SamplingParams,
    ) -> Result<GenerationResponse, GenerationError> {
        if self.cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }
        let request = GenerationRequest::new(messages(prompt), sampling).with_tools(tools.to_vec());
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(GenerationError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.generator.generate(request, self.cancel)) => {
                match result {
                    Ok(response) => response,
                    Err(_) => {
                        warn!(timeout_secs = self.timeout.as_secs(), "Generation timed out");
                        Err(GenerationError::Timeout)
                    }
                }
            }
        }
    }

    /// Plain-text sample for voting; any failure is a missing sample.
    pub(crate) async fn sample_text(&self, prompt: &str, sampling: SamplingParams) -> Option<String> {
        match self.generate(prompt, &[], sampling).await {
            Ok(response) => response.non_empty_text().map(str::to_string),
            Err(e) => {
                debug!(error = %e, "Sample dropped");
                None
            }
        }
    }
}

/// System prompt plus one user message.
pub(crate) fn messages(prompt: &str) -> Vec<Message> {
    vec![
        Message::system(TurnPromptTemplate::system()),
        Message::user(prompt),
    ]
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

/// Fresh opaque identifier.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
