//! INTERPRET: rewrite the utterance into an actionable request, answer it
//! directly, or ask for clarification.

use super::RunTurnUseCase;
use super::types::{RunTurnError, Transition};
use crate::ports::progress::TurnProgressNotifier;
use crate::ports::status::StatusReader;
use crate::ports::text_generator::{GenerationError, TextGenerator};
use crate::ports::tool_boundary::ToolBoundary;
use crate::use_cases::retry::Retry;
use helm_domain::{
    GenerationResponse, Interpretation, TurnBranch, TurnInput, TurnPromptTemplate, TurnState,
    TurnWorkingState, parse_interpretation,
};
use serde_json::json;
use tracing::{info, warn};

impl<G, T, S> RunTurnUseCase<G, T, S>
where
    G: TextGenerator + 'static,
    T: ToolBoundary + 'static,
    S: StatusReader + 'static,
{
    pub(super) async fn interpret(
        &self,
        input: &TurnInput,
        history: &str,
        state: &mut TurnWorkingState,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<Transition, RunTurnError> {
        if !self.params.rewrite_queries {
            return Ok(Transition::Next(TurnState::SelectTool));
        }

        let interpretation = self.interpretation(input, history, state, progress).await?;
        info!(kind = interpretation.label(), text = interpretation.text(), "Interpreted request");
        progress.on_interpretation(interpretation.label(), interpretation.text());
        self.log(
            "interpretation",
            json!({
                "turn_id": state.turn_id.as_str(),
                "kind": interpretation.label(),
                "text": interpretation.text(),
            }),
        );

        Ok(match interpretation {
            Interpretation::Respond(text) => {
                self.finish(state, text, "Answered without tools.", TurnBranch::Satisfied)
            }
            Interpretation::Ask(question) => {
                self.finish(state, question, state.state_summary(), TurnBranch::Ask)
            }
            Interpretation::Act(request) => {
                // A bare tool name runs that tool against the user's own words.
                if let Some(tool) = self.tool_spec.resolve(request.trim()).map(str::to_string) {
                    if !state.begin_iteration() {
                        return Ok(self.max_iterations_output(state));
                    }
                    state.current_tool = Some(tool);
                    return Ok(Transition::Next(TurnState::Execute));
                }
                if let Err(e) = state.adopt_query(request) {
                    warn!(error = %e, "Rewritten request ignored");
                }
                Transition::Next(TurnState::SelectTool)
            }
        })
    }

    async fn interpretation(
        &self,
        input: &TurnInput,
        history: &str,
        state: &TurnWorkingState,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<Interpretation, RunTurnError> {
        let prompt = TurnPromptTemplate::interpret(input, history, &self.tool_spec);
        let bounded = &self.bounded();
        let outcome = Retry::new(self.params.max_generation_attempts)
            .on_retry(|attempt, reason| progress.on_retry("interpret", attempt, reason))
            .with_escalation(
                &[],
                |sampling| bounded.generate(&prompt, &[], sampling),
                |response: &GenerationResponse| match parse_interpretation(&response.text) {
                    Some(_) => None,
                    None => Some("reply has no ACT, RESPOND or ASK line".to_string()),
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

        Ok(outcome
            .accepted_value()
            .and_then(|response| parse_interpretation(&response.text))
            .unwrap_or_else(|| {
                warn!("No usable interpretation, acting on the utterance as given");
                Interpretation::Act(state.original_query().to_string())
            }))
    }
}
