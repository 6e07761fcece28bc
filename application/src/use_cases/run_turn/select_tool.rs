//! SELECT_TOOL: vote on the next tool for the remaining request.

use super::RunTurnUseCase;
use super::types::{RunTurnError, Transition};
use crate::ports::progress::TurnProgressNotifier;
use crate::ports::status::StatusReader;
use crate::ports::text_generator::TextGenerator;
use crate::ports::tool_boundary::ToolBoundary;
use crate::use_cases::consensus::run_with_consensus;
use crate::use_cases::shared::check_cancelled;
use helm_domain::{
    SelectionOutcome, SelectionPrompt, SelectionReply, ToolSelection, TurnBranch,
    TurnPromptTemplate, TurnState, TurnWorkingState, parse_selection_reply, status_prompt_text,
};
use serde_json::json;
use tracing::{debug, info};

impl<G, T, S> RunTurnUseCase<G, T, S>
where
    G: TextGenerator + 'static,
    T: ToolBoundary + 'static,
    S: StatusReader + 'static,
{
    pub(super) async fn select_tool(
        &self,
        history: &str,
        state: &mut TurnWorkingState,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<Transition, RunTurnError> {
        if !state.begin_iteration() {
            info!(max = state.max_iterations(), "Iteration ceiling reached");
            return Ok(self.max_iterations_output(state));
        }

        self.refresh_status(state).await;
        let selection = self.run_selection(history, state).await?;

        let winner = match &selection.outcome {
            SelectionOutcome::Tool(name) => Some(name.as_str()),
            SelectionOutcome::Done => Some("done"),
            SelectionOutcome::Question(_) => Some("question"),
            SelectionOutcome::NoConsensus => None,
        };
        info!(
            iteration = state.iteration(),
            selected = winner.unwrap_or("-"),
            agreement = selection.agreement,
            queries = selection.queries_run,
            "Tool selection"
        );
        progress.on_consensus(
            "selection",
            winner,
            selection.agreement,
            selection.queries_run,
        );
        self.log(
            "tool_selected",
            json!({
                "turn_id": state.turn_id.as_str(),
                "iteration": state.iteration(),
                "selected": winner,
                "agreement": selection.agreement,
                "queries_run": selection.queries_run,
            }),
        );

        let outcome = selection.outcome.clone();
        state.last_selection = Some(selection);

        Ok(match outcome {
            SelectionOutcome::Tool(name) => {
                state.current_tool = Some(name);
                Transition::Next(TurnState::Execute)
            }
            // Reflection decides whether the question goes to the user.
            SelectionOutcome::Done | SelectionOutcome::Question(_) => {
                Transition::Next(TurnState::ReflectSummarize)
            }
            SelectionOutcome::NoConsensus if !state.events().is_empty() => {
                Transition::Next(TurnState::ReflectSummarize)
            }
            SelectionOutcome::NoConsensus => self.finish(
                state,
                "I couldn't decide what to do because the language model gave no usable answer. Please try again.",
                state.state_summary(),
                TurnBranch::Error,
            ),
        })
    }

    /// One consensus round over selection replies.
    pub(super) async fn run_selection(
        &self,
        history: &str,
        state: &TurnWorkingState,
    ) -> Result<ToolSelection, RunTurnError> {
        let status = status_prompt_text(state.status());
        let prompt = TurnPromptTemplate::selection(&SelectionPrompt {
            remaining_query: &state.remaining_query,
            tools: &self.tool_spec,
            events: state.events(),
            failed_tools: state.failed_tools(),
            history,
            status: &status,
            iteration: state.iteration(),
            max_iterations: state.max_iterations(),
        });

        let bounded = &self.bounded();
        let prompt = prompt.as_str();
        let spec = &self.tool_spec;
        let consensus = run_with_consensus(
            |sampling| async move {
                let reply = bounded.sample_text(prompt, sampling).await?;
                let parsed = parse_selection_reply(&reply, spec);
                debug!(reply = %reply, parsed = ?parsed, "Selection sample");
                (parsed != SelectionReply::Empty).then_some(parsed)
            },
            SelectionReply::is_equivalent,
            &self.params.selection_consensus(),
        )
        .await;
        check_cancelled(&self.cancellation_token)?;

        Ok(ToolSelection::from_consensus(&consensus))
    }
}
