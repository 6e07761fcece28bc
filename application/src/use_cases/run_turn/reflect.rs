//! REFLECT_SUMMARIZE: vote on continue/done/ask, then produce the matching
//! follow-up text.

use super::RunTurnUseCase;
use super::types::{RunTurnError, Transition};
use crate::ports::progress::TurnProgressNotifier;
use crate::ports::status::StatusReader;
use crate::ports::text_generator::TextGenerator;
use crate::ports::tool_boundary::ToolBoundary;
use crate::use_cases::consensus::run_with_consensus;
use crate::use_cases::shared::check_cancelled;
use helm_domain::{
    DecisionWord, ReflectionDecision, ReflectionPrompt, TurnBranch, TurnPromptTemplate, TurnState,
    TurnWorkingState, clean_follow_up, parse_decision_word, remaining_or_none, status_prompt_text,
};
use serde_json::json;
use tracing::{debug, info};

impl<G, T, S> RunTurnUseCase<G, T, S>
where
    G: TextGenerator + 'static,
    T: ToolBoundary + 'static,
    S: StatusReader + 'static,
{
    pub(super) async fn reflect(
        &self,
        history: &str,
        state: &mut TurnWorkingState,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<Transition, RunTurnError> {
        self.refresh_status(state).await;
        let decision = self.decide(history, state, progress).await?;

        info!(decision = decision.kind().as_str(), iteration = state.iteration(), "Reflection");
        progress.on_reflection(&decision);
        self.log(
            "reflection",
            json!({
                "turn_id": state.turn_id.as_str(),
                "iteration": state.iteration(),
                "reflection": decision,
            }),
        );

        Ok(match decision {
            ReflectionDecision::Continue { remaining_query } => {
                state.remaining_query = remaining_query;
                Transition::Next(TurnState::SelectTool)
            }
            ReflectionDecision::Done { summary } => {
                self.finish(state, summary, state.state_summary(), TurnBranch::Satisfied)
            }
            ReflectionDecision::Ask { question } => {
                self.finish(state, question, state.state_summary(), TurnBranch::Ask)
            }
        })
    }

    pub(super) async fn decide(
        &self,
        history: &str,
        state: &TurnWorkingState,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<ReflectionDecision, RunTurnError> {
        let status = status_prompt_text(state.status());
        let pending_question = state.last_selection.as_ref().and_then(|s| s.question());
        let ctx = ReflectionPrompt {
            original_query: state.original_query(),
            remaining_query: &state.remaining_query,
            events: state.events(),
            tools: &self.tool_spec,
            history,
            status: &status,
            iteration: state.iteration(),
            max_iterations: state.max_iterations(),
            confident_done: state
                .last_selection
                .as_ref()
                .is_some_and(|s| s.is_confident_done(self.params.selection_min_matches)),
            pending_question,
        };

        let word = self.decision_word(&ctx, state, progress).await?;
        Ok(match word {
            DecisionWord::Continue => {
                let reply = self
                    .generate_text(&TurnPromptTemplate::remaining(&ctx), "remaining", progress)
                    .await?;
                match reply {
                    Some(reply) => match remaining_or_none(&reply) {
                        Some(remaining_query) => ReflectionDecision::Continue { remaining_query },
                        None => {
                            debug!("Nothing left to do, finishing");
                            ReflectionDecision::Done {
                                summary: self.summarize(&ctx, state, progress).await?,
                            }
                        }
                    },
                    None => {
                        debug!("No remaining action produced, finishing");
                        ReflectionDecision::Done {
                            summary: self.summarize(&ctx, state, progress).await?,
                        }
                    }
                }
            }
            DecisionWord::Done => ReflectionDecision::Done {
                summary: self.summarize(&ctx, state, progress).await?,
            },
            DecisionWord::Ask => {
                let last_error = state.last_failure().map(|e| e.result.as_str());
                let reply = self
                    .generate_text(
                        &TurnPromptTemplate::question(&ctx, last_error),
                        "question",
                        progress,
                    )
                    .await?;
                let question = reply
                    .map(|r| clean_follow_up(&r))
                    .filter(|q| !q.is_empty())
                    .unwrap_or_else(|| match (last_error, pending_question) {
                        (Some(error), _) => {
                            format!("The last step failed: {}. How should I proceed?", error)
                        }
                        (None, Some(question)) => question.to_string(),
                        (None, None) => "Could you tell me more about what you'd like me to do?"
                            .to_string(),
                    });
                ReflectionDecision::Ask { question }
            }
        })
    }

    async fn decision_word(
        &self,
        ctx: &ReflectionPrompt<'_>,
        state: &TurnWorkingState,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<DecisionWord, RunTurnError> {
        let prompt = TurnPromptTemplate::decision(ctx);
        let bounded = &self.bounded();
        let prompt = prompt.as_str();
        let consensus = run_with_consensus(
            |sampling| async move {
                bounded
                    .sample_text(prompt, sampling)
                    .await
                    .as_deref()
                    .and_then(parse_decision_word)
            },
            |a, b| a == b,
            &self.params.decision_consensus(),
        )
        .await;
        check_cancelled(&self.cancellation_token)?;

        progress.on_consensus(
            "decision",
            consensus.result.map(|w| w.as_str()),
            consensus.match_count,
            consensus.queries_run,
        );

        Ok(consensus.result.unwrap_or_else(|| {
            let word = match state.last_event() {
                Some(event) if event.success => DecisionWord::Done,
                _ => DecisionWord::Ask,
            };
            debug!(fallback = word.as_str(), "No decision samples");
            word
        }))
    }

    async fn summarize(
        &self,
        ctx: &ReflectionPrompt<'_>,
        state: &TurnWorkingState,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<String, RunTurnError> {
        let reply = self
            .generate_text(&TurnPromptTemplate::summary(ctx), "summary", progress)
            .await?;
        Ok(reply
            .map(|r| clean_follow_up(&r))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| state.state_summary()))
    }
}
