//! Prompt templates for the turn loop
//!
//! Every template opens with a fixed heading so replies can be traced back
//! to the step that asked for them.

use crate::tool::{ToolDefinition, ToolEvent, ToolSpec};
use crate::turn::TurnInput;

/// Most recent events shown in a prompt.
pub const MAX_PROMPT_EVENTS: usize = 8;

/// Context for a tool selection prompt.
#[derive(Debug, Clone, Copy)]
pub struct SelectionPrompt<'a> {
    pub remaining_query: &'a str,
    pub tools: &'a ToolSpec,
    pub events: &'a [ToolEvent],
    pub failed_tools: &'a [String],
    pub history: &'a str,
    pub status: &'a str,
    pub iteration: usize,
    pub max_iterations: usize,
}

/// Shared context for the reflection prompts.
#[derive(Debug, Clone, Copy)]
pub struct ReflectionPrompt<'a> {
    pub original_query: &'a str,
    pub remaining_query: &'a str,
    pub events: &'a [ToolEvent],
    pub tools: &'a ToolSpec,
    pub history: &'a str,
    pub status: &'a str,
    pub iteration: usize,
    pub max_iterations: usize,
    /// The last selection round agreed that no tool is needed
    pub confident_done: bool,
    /// Clarifying question the last selection round produced
    pub pending_question: Option<&'a str>,
}

/// Templates for the turn loop prompts
pub struct TurnPromptTemplate;

impl TurnPromptTemplate {
    pub const INTERPRET_HEADING: &'static str = "## Interpret Request";
    pub const SELECTION_HEADING: &'static str = "## Select Next Tool";
    pub const EXECUTION_HEADING: &'static str = "## Call Tool";
    pub const DECISION_HEADING: &'static str = "## Decide Next Step";
    pub const REMAINING_HEADING: &'static str = "## Remaining Action";
    pub const SUMMARY_HEADING: &'static str = "## Summarize Result";
    pub const QUESTION_HEADING: &'static str = "## Question For User";

    /// System prompt shared by every call
    pub fn system() -> String {
        r#"You are an operator assistant that carries out requests by calling tools one at a time.
Answer exactly in the format each instruction asks for. Do not add explanations unless asked."#
            .to_string()
    }

    /// Rewrite an utterance into a self-contained request.
    pub fn interpret(input: &TurnInput, history: &str, tools: &ToolSpec) -> String {
        let previous = match &input.previous_response {
            Some(response) if input.follows_question() => format!(
                "You previously asked the user:\n{}\n\nThe new message may be an answer to that question; combine both into one request.\n\n",
                response.trim()
            ),
            Some(response) => format!("Your previous response:\n{}\n\n", response.trim()),
            None => String::new(),
        };
        let tool_names = tools.names().collect::<Vec<_>>().join(", ");

        format!(
            r#"{heading}

{previous}## Earlier Turns

{history}

## Available Tools

{tool_names}

## User Message

{utterance}

## Instructions

Reply with exactly one line:
- `ACT: <self-contained request>` when tools are needed
- `RESPOND: <answer>` when you can answer directly without tools
- `ASK: <question>` when the message is too unclear to act on"#,
            heading = Self::INTERPRET_HEADING,
            utterance = input.utterance.trim(),
        )
    }

    /// Ask which single tool should run next.
    pub fn selection(ctx: &SelectionPrompt<'_>) -> String {
        let common = ctx
            .tools
            .common_tools()
            .map(describe_tool)
            .collect::<Vec<_>>()
            .join("\n");
        let extended = ctx
            .tools
            .extended_tools()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let failed = if ctx.failed_tools.is_empty() {
            String::new()
        } else {
            format!(
                "\n## Recently Failed\n\n{} (recently failed; avoid unless the request needs them)\n",
                ctx.failed_tools.join(", ")
            )
        };

        format!(
            r#"{heading}

## Request

{remaining}

## Common Tools

{common}

## Other Tools

{extended}
{failed}
## Actions So Far ({iteration}/{max_iterations})

{events}

## Earlier Turns

{history}

## Current Status

{status}

## Instructions

Reply with the name of the single tool that should run next, and nothing else.
If the request is already satisfied, reply `done`.
If you cannot continue without more information, reply with a short question for the user."#,
            heading = Self::SELECTION_HEADING,
            remaining = ctx.remaining_query.trim(),
            common = or_none(&common),
            extended = or_none(&extended),
            iteration = ctx.iteration,
            max_iterations = ctx.max_iterations,
            events = render_events(ctx.events),
            history = ctx.history,
            status = ctx.status,
        )
    }

    /// Focused instruction for calling one tool.
    pub fn execution(
        tool: &ToolDefinition,
        remaining_query: &str,
        previous_summary: Option<&str>,
        prior_error: Option<&str>,
    ) -> String {
        let params = tool.parameter_lines().join("\n");
        let previous = previous_summary
            .map(|s| format!("\n## Previous Action\n\n{}\n", s))
            .unwrap_or_default();
        let error = prior_error
            .map(|e| format!("\n## Last Attempt Failed\n\n{}\n", e))
            .unwrap_or_default();

        format!(
            r#"{heading}: {name}

{description}

## Parameters

{params}

## Request

{remaining}
{previous}{error}
## Instructions

Call `{name}` with arguments that carry out the request. Omit parameters you do not need."#,
            heading = Self::EXECUTION_HEADING,
            name = tool.name,
            description = tool.description,
            params = or_none(&params),
            remaining = remaining_query.trim(),
        )
    }

    /// Single-word decision: continue, done or ask.
    pub fn decision(ctx: &ReflectionPrompt<'_>) -> String {
        let hint = match (ctx.confident_done, ctx.pending_question) {
            (true, _) => "\nNote: the last tool selection agreed that no further tool is needed, so the goal is most likely met.\n".to_string(),
            (false, Some(question)) => format!(
                "\nNote: instead of naming a tool, the last tool selection asked: \"{}\". Reply `ask` if the user must answer that before going on.\n",
                question.trim()
            ),
            (false, None) => String::new(),
        };
        format!(
            r#"{heading}

{context}
{hint}
## Instructions

Reply with exactly one word:
- `continue` if part of the request still needs a tool
- `done` if the request is satisfied
- `ask` if you need the user's input to go on"#,
            heading = Self::DECISION_HEADING,
            context = reflection_context(ctx),
        )
    }

    /// What specific action remains.
    pub fn remaining(ctx: &ReflectionPrompt<'_>) -> String {
        format!(
            r#"{heading}

{context}

## Instructions

Describe in one sentence the specific action that still remains. If nothing remains, reply `none`."#,
            heading = Self::REMAINING_HEADING,
            context = reflection_context(ctx),
        )
    }

    /// Short summary for the user.
    pub fn summary(ctx: &ReflectionPrompt<'_>) -> String {
        format!(
            r#"{heading}

{context}

## Instructions

Tell the user in one or two short sentences what was done. Do not mention tool names."#,
            heading = Self::SUMMARY_HEADING,
            context = reflection_context(ctx),
        )
    }

    /// Targeted question, anchored on the latest error if any.
    pub fn question(ctx: &ReflectionPrompt<'_>, last_error: Option<&str>) -> String {
        let error = last_error
            .map(|e| {
                format!(
                    "\n## Latest Error\n\n{}\n\nAsk about what is needed to resolve this error first.\n",
                    e.trim()
                )
            })
            .unwrap_or_default();
        let suggested = ctx
            .pending_question
            .map(|q| format!("\n## Suggested Question\n\n{}\n", q.trim()))
            .unwrap_or_default();
        format!(
            r#"{heading}

{context}
{error}{suggested}
## Instructions

Write one short question that asks the user for exactly what is needed to continue."#,
            heading = Self::QUESTION_HEADING,
            context = reflection_context(ctx),
        )
    }
}

fn describe_tool(tool: &ToolDefinition) -> String {
    let params = tool
        .parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if params.is_empty() {
        format!("- {}: {}", tool.name, tool.description)
    } else {
        format!("- {}({}): {}", tool.name, params, tool.description)
    }
}

fn render_events(events: &[ToolEvent]) -> String {
    if events.is_empty() {
        return "(none yet)".to_string();
    }
    let skip = events.len().saturating_sub(MAX_PROMPT_EVENTS);
    let mut lines = Vec::new();
    if skip > 0 {
        lines.push(format!("({} earlier actions omitted)", skip));
    }
    lines.extend(events[skip..].iter().map(ToolEvent::prompt_line));
    lines.join("\n")
}

fn reflection_context(ctx: &ReflectionPrompt<'_>) -> String {
    let tools = ctx.tools.names().collect::<Vec<_>>().join(", ");
    format!(
        r#"## Original Request

{original}

## Working On

{remaining}

## Actions So Far ({iteration}/{max_iterations})

{events}

## Available Tools

{tools}

## Earlier Turns

{history}

## Current Status

{status}"#,
        original = ctx.original_query.trim(),
        remaining = ctx.remaining_query.trim(),
        iteration = ctx.iteration,
        max_iterations = ctx.max_iterations,
        events = render_events(ctx.events),
        tools = or_none(&tools),
        history = ctx.history,
        status = ctx.status,
    )
}

fn or_none(s: &str) -> &str {
    if s.trim().is_empty() { "(none)" } else { s }
}
