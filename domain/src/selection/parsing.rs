//! Parsing of tool-selection replies
//!
//! All fuzzy matching of generator text against tool names lives here. The
//! rest of the crate only sees [`SelectionReply`].

use crate::core::string::{first_line, normalize_words, strip_decoration};
use crate::tool::ToolSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Replies that mean "no further tool is needed".
const COMPLETION_MARKERS: &[&str] = &[
    "done",
    "none",
    "complete",
    "completed",
    "finished",
    "nothing",
    "no tool",
    "no tools",
    "no tool needed",
    "no tool required",
    "no action",
    "no further action",
    "n/a",
    "na",
    "null",
];

/// Prefixes a generator tends to put before the tool name.
const REPLY_PREFIXES: &[&str] = &["next tool:", "tool:", "answer:", "selected tool:"];

/// Minimum length of a fragment used as a tool-name prefix.
const MIN_PREFIX_LEN: usize = 4;
/// Maximum edit distance accepted for a misspelled tool name.
const MAX_EDIT_DISTANCE: usize = 2;

/// One parsed selection sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SelectionReply {
    /// A known tool, by canonical name
    Tool(String),
    /// No further tool is needed
    Done,
    /// The generator asked something instead
    Question(String),
    /// Nothing usable
    Empty,
}

impl SelectionReply {
    /// Same tool, both done, or both questions (content is not compared).
    pub fn is_equivalent(&self, other: &SelectionReply) -> bool {
        match (self, other) {
            (SelectionReply::Tool(a), SelectionReply::Tool(b)) => a == b,
            (SelectionReply::Done, SelectionReply::Done) => true,
            (SelectionReply::Question(a), SelectionReply::Question(b)) => {
                !a.is_empty() && !b.is_empty()
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SelectionReply::Empty)
    }
}

/// Parse one raw reply.
///
/// Order: exact name, completion marker, exactly one tool identifier
/// anywhere in the text, fuzzy match of a lone identifier, then question.
///
/// ```
/// use helm_domain::{SelectionReply, ToolDefinition, ToolSpec, ToolTier, parse_selection_reply};
///
/// let spec = ToolSpec::new().register(ToolDefinition::new("lights_on", "", ToolTier::Common));
/// assert_eq!(parse_selection_reply("`lights_on`", &spec), SelectionReply::Tool("lights_on".into()));
/// assert_eq!(parse_selection_reply("None.", &spec), SelectionReply::Done);
/// ```
pub fn parse_selection_reply(reply: &str, tools: &ToolSpec) -> SelectionReply {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return SelectionReply::Empty;
    }

    let line = strip_prefix(strip_decoration(first_line(trimmed)));
    if line.is_empty() {
        return SelectionReply::Empty;
    }

    if let Some(name) = exact_match(line, tools) {
        return SelectionReply::Tool(name);
    }

    if is_completion_marker(line) {
        return SelectionReply::Done;
    }

    let mentioned = mentioned_tools(trimmed, tools);
    if mentioned.len() == 1
        && let Some(name) = mentioned.into_iter().next()
    {
        return SelectionReply::Tool(name);
    }

    if is_identifier(line)
        && let Some(name) = fuzzy_match(line, tools)
    {
        return SelectionReply::Tool(name);
    }

    SelectionReply::Question(trimmed.to_string())
}

/// Whether a reply is one of the recognized completion markers.
pub fn is_completion_marker(text: &str) -> bool {
    COMPLETION_MARKERS.contains(&normalize_words(text).as_str())
}

/// Prefixes are ASCII, so compare bytes of the original line in place.
fn strip_prefix(line: &str) -> &str {
    for prefix in REPLY_PREFIXES {
        if let Some(head) = line.get(..prefix.len())
            && head.eq_ignore_ascii_case(prefix)
            && let Some(rest) = line.get(prefix.len()..)
        {
            return strip_decoration(rest);
        }
    }
    line
}

fn exact_match(line: &str, tools: &ToolSpec) -> Option<String> {
    if let Some(name) = tools.resolve(line) {
        return Some(name.to_string());
    }
    let lower = line.to_lowercase();
    tools
        .names()
        .find(|name| name.to_lowercase() == lower)
        .map(str::to_string)
        .or_else(|| tools.resolve(&lower).map(str::to_string))
}

/// Distinct canonical tool names appearing as whole identifiers.
fn mentioned_tools(text: &str, tools: &ToolSpec) -> BTreeSet<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            let lower = token.to_lowercase();
            tools
                .names()
                .find(|name| name.to_lowercase() == lower)
                .or_else(|| tools.resolve(&lower))
                .map(str::to_string)
        })
        .collect()
}

fn is_identifier(line: &str) -> bool {
    !line.is_empty()
        && line
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn fragments(s: &str) -> BTreeSet<String> {
    s.to_lowercase()
        .split(['_', '-'])
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// Unique prefix, then unique fragment set, then unique nearest edit distance.
fn fuzzy_match(token: &str, tools: &ToolSpec) -> Option<String> {
    let lower = token.to_lowercase();
    let names: Vec<&str> = tools.names().collect();

    if lower.len() >= MIN_PREFIX_LEN {
        let prefixed: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| name.to_lowercase().starts_with(&lower))
            .collect();
        if let [only] = prefixed.as_slice() {
            return Some(only.to_string());
        }
    }

    let token_fragments = fragments(&lower);
    let same_fragments: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| fragments(name) == token_fragments)
        .collect();
    if let [only] = same_fragments.as_slice() {
        return Some(only.to_string());
    }

    let mut best: Option<(usize, &str)> = None;
    let mut best_is_unique = false;
    for name in &names {
        let distance = levenshtein(&lower, &name.to_lowercase());
        if distance > MAX_EDIT_DISTANCE {
            continue;
        }
        match best {
            Some((top, _)) if distance > top => {}
            Some((top, _)) if distance == top => best_is_unique = false,
            _ => {
                best = Some((distance, *name));
                best_is_unique = true;
            }
        }
    }
    match best {
        Some((_, name)) if best_is_unique => Some(name.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b_chars.len()]
}
