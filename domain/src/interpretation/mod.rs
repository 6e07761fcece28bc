//! Interpretation of a raw utterance
//!
//! The first state of a turn rewrites the utterance into a self-contained
//! request. The generator answers with one of three tagged lines:
//!
//! ```text
//! ACT: <request to carry out with tools>
//! RESPOND: <direct answer, no tools needed>
//! ASK: <question back to the user>
//! ```

use serde::{Deserialize, Serialize};

/// Parsed interpretation reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Interpretation {
    Act(String),
    Respond(String),
    Ask(String),
}

impl Interpretation {
    pub fn text(&self) -> &str {
        match self {
            Interpretation::Act(t) | Interpretation::Respond(t) | Interpretation::Ask(t) => t,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Interpretation::Act(_) => "act",
            Interpretation::Respond(_) => "respond",
            Interpretation::Ask(_) => "ask",
        }
    }
}

/// Parse a tagged interpretation reply.
///
/// The first line carrying a known tag wins; text after the tag may
/// continue on following lines. Returns `None` when no tag is present or
/// the tagged text is empty.
pub fn parse_interpretation(reply: &str) -> Option<Interpretation> {
    let lines: Vec<&str> = reply.lines().collect();
    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim().trim_start_matches(['*', '-', ' ']);
        let Some((tag, rest)) = trimmed.split_once(':') else {
            continue;
        };
        let build: fn(String) -> Interpretation = match tag.trim().to_uppercase().as_str() {
            "ACT" => Interpretation::Act,
            "RESPOND" => Interpretation::Respond,
            "ASK" => Interpretation::Ask,
            _ => continue,
        };
        let mut text = rest.trim().trim_matches('*').trim().to_string();
        for following in &lines[index + 1..] {
            let following = following.trim();
            if following.is_empty() {
                break;
            }
            text.push(' ');
            text.push_str(following);
        }
        if text.is_empty() {
            return None;
        }
        return Some(build(text));
    }
    None
}
