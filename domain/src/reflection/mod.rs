//! Reflection decisions
//!
//! After each tool execution the agent decides whether the request is
//! satisfied, what remains, or what to ask the user. The decision is a sum
//! type so exactly one of remaining query, summary or question exists.

use crate::core::string::{first_line, is_nothing_marker, strip_decoration};
use serde::{Deserialize, Serialize};

/// Single-word answer to "continue, done or ask?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionWord {
    Continue,
    Done,
    Ask,
}

impl DecisionWord {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionWord::Continue => "continue",
            DecisionWord::Done => "done",
            DecisionWord::Ask => "ask",
        }
    }
}

impl std::fmt::Display for DecisionWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse a decision reply. Only the first word of the first line counts;
/// anything else is malformed.
pub fn parse_decision_word(reply: &str) -> Option<DecisionWord> {
    let line = strip_decoration(first_line(reply)).to_lowercase();
    let line = line.strip_prefix("decision:").unwrap_or(&line).trim();
    let word = line
        .split(|c: char| !c.is_alphabetic())
        .find(|w| !w.is_empty())?;
    match word {
        "continue" => Some(DecisionWord::Continue),
        "done" => Some(DecisionWord::Done),
        "ask" => Some(DecisionWord::Ask),
        _ => None,
    }
}

/// Outcome of reflection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum ReflectionDecision {
    Continue { remaining_query: String },
    Done { summary: String },
    Ask { question: String },
}

impl ReflectionDecision {
    pub fn kind(&self) -> DecisionWord {
        match self {
            ReflectionDecision::Continue { .. } => DecisionWord::Continue,
            ReflectionDecision::Done { .. } => DecisionWord::Done,
            ReflectionDecision::Ask { .. } => DecisionWord::Ask,
        }
    }

    pub fn remaining_query(&self) -> Option<&str> {
        match self {
            ReflectionDecision::Continue { remaining_query } => Some(remaining_query),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            ReflectionDecision::Done { summary } => Some(summary),
            _ => None,
        }
    }

    pub fn question(&self) -> Option<&str> {
        match self {
            ReflectionDecision::Ask { question } => Some(question),
            _ => None,
        }
    }
}

/// Clean a free-text follow-up reply: drop a leading label such as
/// `Summary:` and surrounding quotes.
pub fn clean_follow_up(reply: &str) -> String {
    let trimmed = reply.trim();
    let body = match trimmed.split_once(':') {
        Some((label, rest))
            if matches!(
                label.trim().to_lowercase().as_str(),
                "summary" | "question" | "remaining" | "remaining action" | "next action"
            ) =>
        {
            rest.trim()
        }
        _ => trimmed,
    };
    body.trim_matches(|c: char| matches!(c, '"' | '`'))
        .trim()
        .to_string()
}

/// The remaining-action text, or `None` when it says nothing is left.
pub fn remaining_or_none(reply: &str) -> Option<String> {
    let cleaned = clean_follow_up(reply);
    if is_nothing_marker(&cleaned) || is_nothing_marker(first_line(&cleaned)) {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decision_word() {
        assert_eq!(parse_decision_word("done"), Some(DecisionWord::Done));
        assert_eq!(parse_decision_word("  Continue.\nbecause"), Some(DecisionWord::Continue));
        assert_eq!(parse_decision_word("**ASK**"), Some(DecisionWord::Ask));
        assert_eq!(parse_decision_word("Decision: done"), Some(DecisionWord::Done));
        assert_eq!(parse_decision_word("maybe"), None);
        assert_eq!(parse_decision_word(""), None);
    }

    #[test]
    fn test_decision_has_exactly_one_payload() {
        let decisions = [
            ReflectionDecision::Continue {
                remaining_query: "raise gear".to_string(),
            },
            ReflectionDecision::Done {
                summary: "Lights on".to_string(),
            },
            ReflectionDecision::Ask {
                question: "Which room?".to_string(),
            },
        ];
        for decision in &decisions {
            let populated = [
                decision.remaining_query().is_some(),
                decision.summary().is_some(),
                decision.question().is_some(),
            ]
            .iter()
            .filter(|p| **p)
            .count();
            assert_eq!(populated, 1, "{decision:?}");
        }
        assert_eq!(decisions[0].kind(), DecisionWord::Continue);
        assert_eq!(decisions[2].kind(), DecisionWord::Ask);
    }

    #[test]
    fn test_remaining_or_none() {
        assert_eq!(remaining_or_none("none"), None);
        assert_eq!(remaining_or_none("  N/A "), None);
        assert_eq!(remaining_or_none("Nothing."), None);
        assert_eq!(remaining_or_none(""), None);
        assert_eq!(remaining_or_none("Remaining: none"), None);
        assert_eq!(
            remaining_or_none("Remaining: deploy the parachute"),
            Some("deploy the parachute".to_string())
        );
    }

    #[test]
    fn test_clean_follow_up() {
        assert_eq!(clean_follow_up("Summary: Lights are on."), "Lights are on.");
        assert_eq!(clean_follow_up("\"Which room?\""), "Which room?");
        assert_eq!(clean_follow_up("Note: keep this"), "Note: keep this");
    }

    #[test]
    fn test_decision_serialization() {
        let json = serde_json::to_value(ReflectionDecision::Done {
            summary: "ok".to_string(),
        })
        .unwrap();
        assert_eq!(json["decision"], "done");
        assert_eq!(json["summary"], "ok");
    }
}
