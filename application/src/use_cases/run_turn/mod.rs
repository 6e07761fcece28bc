//! Run Turn use case
//!
//! Drives one utterance through the decision loop:
//!
//! | State               | Handler                | Exits to                               |
//! |---------------------|------------------------|----------------------------------------|
//! | `INTERPRET`         | [`interpret`]          | `SELECT_TOOL`, `EXECUTE`, respond, ask |
//! | `SELECT_TOOL`       | [`select_tool`]        | `EXECUTE`, `REFLECT_SUMMARIZE`, ask, ceiling |
//! | `EXECUTE`           | [`execute_tool`]       | `REFLECT_SUMMARIZE`                    |
//! | `REFLECT_SUMMARIZE` | [`reflect`]            | `SELECT_TOOL`, done, ask               |
//!
//! The driver owns the [`TurnWorkingState`]; handlers borrow it and return
//! a transition. Only cancellation escapes as an error.

mod execute_tool;
mod interpret;
mod reflect;
mod select_tool;
mod types;


pub use types::RunTurnError;

use types::Transition;

use crate::config::ExecutionParams;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::progress::{NoTurnProgress, TurnProgressNotifier};
use crate::ports::status::{NoStatus, StatusReader};
use crate::ports::text_generator::{GenerationError, TextGenerator};
use crate::ports::tool_boundary::ToolBoundary;
use crate::use_cases::retry::Retry;
use crate::use_cases::shared::{BoundedGenerator, check_cancelled, new_id};
use helm_domain::{
    GenerationResponse, GroupId, ToolSpec, TurnBranch, TurnHistory, TurnId, TurnInput, TurnOutput,
    TurnState, TurnWorkingState,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Use case for running one conversational turn
pub struct RunTurnUseCase<
    G: TextGenerator + 'static,
    T: ToolBoundary + 'static,
    S: StatusReader + 'static = NoStatus,
> {
    generator: Arc<G>,
    tools: Arc<T>,
    status_reader: Arc<S>,
    params: ExecutionParams,
    tool_spec: ToolSpec,
    cancellation_token: CancellationToken,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl<G, T, S> Clone for RunTurnUseCase<G, T, S>
where
    G: TextGenerator + 'static,
    T: ToolBoundary + 'static,
    S: StatusReader + 'static,
{
    fn clone(&self) -> Self {
        Self {
            generator: self.generator.clone(),
            tools: self.tools.clone(),
            status_reader: self.status_reader.clone(),
            params: self.params.clone(),
            tool_spec: self.tool_spec.clone(),
            cancellation_token: self.cancellation_token.clone(),
            conversation_logger: self.conversation_logger.clone(),
        }
    }
}

impl<G: TextGenerator + 'static, T: ToolBoundary + 'static> RunTurnUseCase<G, T, NoStatus> {
    pub fn new(generator: Arc<G>, tools: Arc<T>, params: ExecutionParams) -> Self {
        let tool_spec = tools.tool_spec().clone().promote(&params.common_tools);
        Self {
            generator,
            tools,
            status_reader: Arc::new(NoStatus),
            params,
            tool_spec,
            cancellation_token: CancellationToken::new(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }
}

impl<G, T, S> RunTurnUseCase<G, T, S>
where
    G: TextGenerator + 'static,
    T: ToolBoundary + 'static,
    S: StatusReader + 'static,
{
    /// Read external status before selection and reflection
    pub fn with_status_reader<R: StatusReader + 'static>(
        self,
        status_reader: Arc<R>,
    ) -> RunTurnUseCase<G, T, R> {
        RunTurnUseCase {
            generator: self.generator,
            tools: self.tools,
            status_reader,
            params: self.params,
            tool_spec: self.tool_spec,
            cancellation_token: self.cancellation_token,
            conversation_logger: self.conversation_logger,
        }
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Set a conversation logger for structured event logging
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn params(&self) -> &ExecutionParams {
        &self.params
    }

    pub fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    /// Execute a turn without progress reporting
    pub async fn execute(
        &self,
        input: TurnInput,
        history: &TurnHistory,
    ) -> Result<TurnOutput, RunTurnError> {
        self.execute_with_progress(input, history, &NoTurnProgress)
            .await
    }

    /// Execute a turn with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: TurnInput,
        history: &TurnHistory,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<TurnOutput, RunTurnError> {
        check_cancelled(&self.cancellation_token)?;

        let turn_id = TurnId::new(new_id());
        let group_id = GroupId::new(new_id());
        info!(turn_id = %turn_id, origin = ?input.origin, "Turn started");
        self.log(
            "turn_started",
            json!({
                "turn_id": turn_id.as_str(),
                "group_id": group_id.as_str(),
                "utterance": input.utterance,
                "origin": input.origin,
            }),
        );

        let utterance = input.utterance.trim();
        if utterance.is_empty() {
            let output = TurnOutput::new(
                "I didn't catch a request. What would you like me to do?",
                "Empty request.",
                TurnBranch::Error,
            );
            return Ok(self.complete(&turn_id, output, progress));
        }

        let mut state = TurnWorkingState::new(
            turn_id.clone(),
            group_id,
            utterance,
            self.params.max_iterations,
        );
        let history_text = history.to_prompt_context();
        let mut current = TurnState::Interpret;

        let output = loop {
            check_cancelled(&self.cancellation_token)?;
            progress.on_state_change(current, state.iteration(), state.max_iterations());
            debug!(state = %current, iteration = state.iteration(), "Entering state");

            let transition = match current {
                TurnState::Interpret => {
                    self.interpret(&input, &history_text, &mut state, progress)
                        .await?
                }
                TurnState::SelectTool => {
                    self.select_tool(&history_text, &mut state, progress)
                        .await?
                }
                TurnState::Execute => self.execute_tool(&mut state, progress).await?,
                TurnState::ReflectSummarize => {
                    self.reflect(&history_text, &mut state, progress).await?
                }
            };

            match transition {
                Transition::Next(next) => current = next,
                Transition::Finish(output) => break output,
            }
        };

        Ok(self.complete(&turn_id, output, progress))
    }

    fn complete(
        &self,
        turn_id: &TurnId,
        output: TurnOutput,
        progress: &dyn TurnProgressNotifier,
    ) -> TurnOutput {
        info!(
            turn_id = %turn_id,
            branch = %output.branch,
            iterations = output.iterations,
            events = output.tool_results.len(),
            "Turn finished"
        );
        self.log(
            "turn_finished",
            json!({
                "turn_id": turn_id.as_str(),
                "branch": output.branch,
                "iterations": output.iterations,
                "text": output.text,
                "state_summary": output.state_summary,
            }),
        );
        progress.on_turn_complete(output.branch, output.iterations);
        output
    }

    fn log(&self, event_type: &'static str, payload: Value) {
        self.conversation_logger
            .log(ConversationEvent::new(event_type, payload));
    }

    fn bounded(&self) -> BoundedGenerator<'_, G> {
        BoundedGenerator::new(
            self.generator.as_ref(),
            self.params.generation_timeout,
            &self.cancellation_token,
        )
    }

    /// Build the terminal transition from the current state.
    fn finish(
        &self,
        state: &TurnWorkingState,
        text: impl Into<String>,
        state_summary: impl Into<String>,
        branch: TurnBranch,
    ) -> Transition {
        Transition::Finish(
            TurnOutput::new(text, state_summary, branch)
                .with_events(state.events().to_vec(), state.iteration()),
        )
    }

    fn max_iterations_output(&self, state: &TurnWorkingState) -> Transition {
        let summary = state.state_summary();
        let text = format!(
            "I stopped after {} steps before finishing \"{}\". {}",
            state.max_iterations(),
            state.original_query(),
            summary
        );
        self.finish(state, text, summary, TurnBranch::MaxIterations)
    }

    /// Read status unless a snapshot is cached. Failures leave it absent.
    async fn refresh_status(&self, state: &mut TurnWorkingState) {
        if state.has_cached_status() {
            return;
        }
        let read = self.status_reader.read_status(&self.cancellation_token);
        let snapshot = tokio::select! {
            biased;
            _ = self.cancellation_token.cancelled() => None,
            result = tokio::time::timeout(self.params.generation_timeout, read) => result.ok().flatten(),
        };
        if snapshot.is_none() {
            debug!("No status snapshot available");
        }
        state.cache_status(snapshot);
    }

    /// Single free-text generation with escalating retry. `None` when no
    /// non-empty reply was produced.
    async fn generate_text(
        &self,
        prompt: &str,
        purpose: &str,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<Option<String>, RunTurnError> {
        let bounded = &self.bounded();
        let outcome = Retry::new(self.params.max_generation_attempts)
            .on_retry(|attempt, reason| progress.on_retry(purpose, attempt, reason))
            .with_escalation(
                &[],
                |sampling| bounded.generate(prompt, &[], sampling),
                |response: &GenerationResponse| {
                    response
                        .non_empty_text()
                        .is_none()
                        .then(|| "empty reply".to_string())
                },
            )
            .await;
        if outcome
            .last_error
            .as_ref()
            .is_some_and(GenerationError::is_cancelled)
        {
            return Err(RunTurnError::Cancelled);
        }
        check_cancelled(&self.cancellation_token)?;
        Ok(outcome
            .accepted_value()
            .and_then(|r| r.non_empty_text().map(str::to_string)))
    }
}
