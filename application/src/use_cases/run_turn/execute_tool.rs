//! EXECUTE: obtain a structured call for the chosen tool and run it.
//!
//! Every path records exactly one [`ToolEvent`]; failures are data, not
//! errors. Cancellation is the exception and leaves no event behind.

use super::RunTurnUseCase;
use super::types::{RunTurnError, Transition};
use crate::ports::progress::TurnProgressNotifier;
use crate::ports::status::StatusReader;
use crate::ports::text_generator::{GenerationError, TextGenerator};
use crate::ports::tool_boundary::{ToolBoundary, ToolBoundaryError};
use crate::use_cases::retry::Retry;
use crate::use_cases::shared::{check_cancelled, new_id, now_millis};
use helm_domain::{
    DomainError, GenerationResponse, ToolEvent, ToolEventId, TurnPromptTemplate, TurnState,
    TurnWorkingState, normalize_arguments,
};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::{info, warn};

impl<G, T, S> RunTurnUseCase<G, T, S>
where
    G: TextGenerator + 'static,
    T: ToolBoundary + 'static,
    S: StatusReader + 'static,
{
    pub(super) async fn execute_tool(
        &self,
        state: &mut TurnWorkingState,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<Transition, RunTurnError> {
        let Some(tool_name) = state.current_tool.clone() else {
            warn!("EXECUTE entered without a selected tool");
            return Ok(Transition::Next(TurnState::SelectTool));
        };

        let event = self.run_tool(state, &tool_name, progress).await?;
        check_cancelled(&self.cancellation_token)?;

        info!(
            tool = %event.tool_name,
            success = event.success,
            result = %helm_domain::truncate(&event.result, 120),
            "Tool event"
        );
        progress.on_tool_result(&event);
        self.log(
            "tool_event",
            json!({
                "turn_id": state.turn_id.as_str(),
                "event": event,
            }),
        );
        state.record_event(event);

        Ok(Transition::Next(TurnState::ReflectSummarize))
    }

    async fn run_tool(
        &self,
        state: &TurnWorkingState,
        tool_name: &str,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<ToolEvent, RunTurnError> {
        let event = |arguments: BTreeMap<String, Value>, result: String, success: bool| ToolEvent {
            id: ToolEventId::new(new_id()),
            group_id: state.group_id.clone(),
            tool_name: tool_name.to_string(),
            arguments,
            result,
            success,
            timestamp: now_millis(),
        };

        let Some(tool) = self.tool_spec.get(tool_name) else {
            let error = DomainError::UnknownTool(tool_name.to_string());
            return Ok(event(BTreeMap::new(), error.to_string(), false));
        };

        let previous = state.last_event().map(ToolEvent::short_summary);
        let prior_error = state
            .last_event()
            .filter(|e| !e.success && e.tool_name == tool_name)
            .map(|e| e.result.clone());
        let prompt = TurnPromptTemplate::execution(
            tool,
            &state.remaining_query,
            previous.as_deref(),
            prior_error.as_deref(),
        );

        let bounded = &self.bounded();
        let definitions = std::slice::from_ref(tool);
        let outcome = Retry::new(self.params.max_tool_call_attempts)
            .on_retry(|attempt, reason| progress.on_retry("tool_call", attempt, reason))
            .with_escalation(
                &[],
                |sampling| bounded.generate(&prompt, definitions, sampling),
                |response: &GenerationResponse| {
                    response
                        .call_for(tool_name)
                        .is_none()
                        .then(|| "reply carried no structured call".to_string())
                },
            )
            .await;
        if bounded.is_cancelled()
            || outcome
                .last_error
                .as_ref()
                .is_some_and(GenerationError::is_cancelled)
        {
            return Err(RunTurnError::Cancelled);
        }

        let call = outcome
            .value
            .as_ref()
            .filter(|_| outcome.accepted)
            .and_then(|response| response.call_for(tool_name))
            .cloned();
        let Some(call) = call else {
            warn!(tool = tool_name, attempts = outcome.attempts, "No structured tool call produced");
            let result = outcome
                .value
                .as_ref()
                .and_then(|response| response.non_empty_text())
                .map(str::to_string)
                .or_else(|| outcome.last_error.as_ref().map(|e| e.to_string()))
                .unwrap_or_else(|| "No tool call was produced.".to_string());
            return Ok(event(BTreeMap::new(), result, false));
        };

        let arguments = normalize_arguments(tool, &call.arguments);
        progress.on_tool_call(
            tool_name,
            &serde_json::to_string(&arguments).unwrap_or_default(),
        );

        let notify = |message: &str| progress.on_tool_progress(tool_name, message);
        let timeout = self.params.tool_timeout;
        let call = self.tools.call_tool(
            tool_name,
            &arguments,
            timeout,
            &notify,
            &self.cancellation_token,
        );
        let result = tokio::select! {
            biased;
            _ = self.cancellation_token.cancelled() => return Err(RunTurnError::Cancelled),
            result = tokio::time::timeout(timeout, call) => result,
        };

        let (text, success) = match result {
            Ok(Ok(outcome)) => {
                let success = outcome.classify();
                let text = outcome.render();
                let text = match (text.trim().is_empty(), success) {
                    (false, _) => text,
                    (true, true) => "Done.".to_string(),
                    (true, false) => "The tool reported a failure without details.".to_string(),
                };
                (text, success)
            }
            Ok(Err(e)) if e.is_cancelled() => return Err(RunTurnError::Cancelled),
            Ok(Err(e)) => (e.to_string(), false),
            Err(_) => {
                let error = ToolBoundaryError::Timeout {
                    tool: tool_name.to_string(),
                    seconds: timeout.as_secs(),
                };
                (error.to_string(), false)
            }
        };

        Ok(event(arguments, text, success))
    }
}
