//! Scripted test doubles for the application ports.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::progress::TurnProgressNotifier;
use crate::ports::status::StatusReader;
use crate::ports::text_generator::{GenerationError, GenerationRequest, TextGenerator};
use crate::ports::tool_boundary::{ProgressFn, ToolBoundary, ToolBoundaryError};
use async_trait::async_trait;
use helm_domain::{
    GenerationResponse, ReflectionDecision, StatusSnapshot, ToolCall, ToolEvent, ToolOutcome,
    ToolSpec, TurnBranch, TurnState,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One scripted generator reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Call(ToolCall),
    Fail(GenerationError),
    /// Never answers; relies on the caller's timeout
    Hang,
}

pub fn text(s: &str) -> Reply {
    Reply::Text(s.to_string())
}

struct Route {
    needle: String,
    queue: VecDeque<Reply>,
    fallback: Option<Reply>,
    calls: usize,
}

/// Generator that answers by matching a needle (usually a prompt heading)
/// against the user prompt. Queued replies are used first, then the
/// fallback. Unrouted prompts fail with a malformed response.
#[derive(Default)]
pub struct ScriptedGenerator {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for prompts containing `needle`.
    pub fn script(self, needle: &str, replies: Vec<Reply>) -> Self {
        self.with_route(needle, |route| route.queue.extend(replies));
        self
    }

    /// Reply used once the queue for `needle` is empty.
    pub fn always(self, needle: &str, reply: Reply) -> Self {
        self.with_route(needle, |route| route.fallback = Some(reply));
        self
    }

    fn with_route(&self, needle: &str, update: impl FnOnce(&mut Route)) {
        let mut routes = self.routes.lock().unwrap();
        let index = match routes.iter().position(|r| r.needle == needle) {
            Some(index) => index,
            None => {
                routes.push(Route {
                    needle: needle.to_string(),
                    queue: VecDeque::new(),
                    fallback: None,
                    calls: 0,
                });
                routes.len() - 1
            }
        };
        update(&mut routes[index]);
    }

    pub fn calls(&self, needle: &str) -> usize {
        self.routes
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.needle == needle)
            .map(|r| r.calls)
            .unwrap_or(0)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self, prompt: &str) -> Option<Reply> {
        let mut routes = self.routes.lock().unwrap();
        let route = routes.iter_mut().find(|r| prompt.contains(&r.needle))?;
        route.calls += 1;
        route.queue.pop_front().or_else(|| route.fallback.clone())
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationResponse, GenerationError> {
        let reply = self.next_reply(request.prompt());
        self.requests.lock().unwrap().push(request);
        match reply {
            Some(Reply::Text(t)) => Ok(GenerationResponse::from_text(t)),
            Some(Reply::Call(call)) => Ok(GenerationResponse::from_text("").with_call(call)),
            Some(Reply::Fail(e)) => Err(e),
            Some(Reply::Hang) => {
                cancel.cancelled().await;
                Err(GenerationError::Cancelled)
            }
            None => Err(GenerationError::MalformedResponse(
                "no scripted reply".to_string(),
            )),
        }
    }
}

/// Tool boundary that records calls and replays scripted outcomes.
/// Unscripted calls succeed with the text "ok".
pub struct RecordingToolBoundary {
    spec: ToolSpec,
    outcomes: Mutex<HashMap<String, VecDeque<Result<ToolOutcome, ToolBoundaryError>>>>,
    calls: Mutex<Vec<(String, BTreeMap<String, Value>)>>,
    progress_messages: Vec<String>,
    delay: Option<Duration>,
}

impl RecordingToolBoundary {
    pub fn new(spec: ToolSpec) -> Self {
        Self {
            spec,
            outcomes: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            progress_messages: Vec::new(),
            delay: None,
        }
    }

    pub fn with_outcome(self, tool: &str, outcome: Result<ToolOutcome, ToolBoundaryError>) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .entry(tool.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    pub fn with_progress(mut self, messages: &[&str]) -> Self {
        self.progress_messages = messages.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(String, BTreeMap<String, Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolBoundary for RecordingToolBoundary {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: &BTreeMap<String, Value>,
        _timeout: Duration,
        progress: ProgressFn<'_>,
        cancel: &CancellationToken,
    ) -> Result<ToolOutcome, ToolBoundaryError> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments.clone()));
        for message in &self.progress_messages {
            progress(message);
        }
        if let Some(delay) = self.delay {
            tokio::select! {
                _ = cancel.cancelled() => return Err(ToolBoundaryError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        let scripted = self
            .outcomes
            .lock()
            .unwrap()
            .get_mut(name)
            .and_then(|q| q.pop_front());
        scripted.unwrap_or_else(|| Ok(ToolOutcome::text("ok")))
    }
}

/// Status reader returning a fixed snapshot and counting reads.
pub struct FixedStatus {
    snapshot: Option<StatusSnapshot>,
    reads: AtomicUsize,
}

impl FixedStatus {
    pub fn new(snapshot: Option<StatusSnapshot>) -> Self {
        Self {
            snapshot,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusReader for FixedStatus {
    async fn read_status(&self, _cancel: &CancellationToken) -> Option<StatusSnapshot> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.snapshot.clone()
    }
}

/// Progress notifier that records what it saw.
#[derive(Default)]
pub struct TrackingProgress {
    pub states: Mutex<Vec<TurnState>>,
    pub tool_progress: Mutex<Vec<String>>,
    pub retries: Mutex<Vec<(String, usize)>>,
    pub decisions: Mutex<Vec<ReflectionDecision>>,
    pub results: Mutex<Vec<ToolEvent>>,
    pub branch: Mutex<Option<TurnBranch>>,
}

impl TurnProgressNotifier for TrackingProgress {
    fn on_state_change(&self, state: TurnState, _iteration: usize, _max_iterations: usize) {
        self.states.lock().unwrap().push(state);
    }

    fn on_retry(&self, purpose: &str, attempt: usize, _reason: &str) {
        self.retries
            .lock()
            .unwrap()
            .push((purpose.to_string(), attempt));
    }

    fn on_tool_progress(&self, _tool_name: &str, message: &str) {
        self.tool_progress.lock().unwrap().push(message.to_string());
    }

    fn on_tool_result(&self, event: &ToolEvent) {
        self.results.lock().unwrap().push(event.clone());
    }

    fn on_reflection(&self, decision: &ReflectionDecision) {
        self.decisions.lock().unwrap().push(decision.clone());
    }

    fn on_turn_complete(&self, branch: TurnBranch, _iterations: usize) {
        *self.branch.lock().unwrap() = Some(branch);
    }
}

/// Conversation logger keeping event types in memory.
#[derive(Default)]
pub struct MemoryLogger {
    pub events: Mutex<Vec<(String, Value)>>,
}

impl MemoryLogger {
    pub fn types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(t, _)| t.clone())
            .collect()
    }
}

impl ConversationLogger for MemoryLogger {
    fn log(&self, event: ConversationEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type.to_string(), event.payload));
    }
}
