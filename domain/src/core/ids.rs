//! Identifiers for the turn lifecycle.
//!
//! All ids are opaque strings. The application layer generates them
//! (UUID v4); the domain only compares and displays them.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identifies one request/response cycle.
    TurnId
);

string_id!(
    /// Identifies the iteration group: every [`ToolEvent`](crate::ToolEvent)
    /// produced while satisfying one request shares this id.
    GroupId
);

string_id!(
    /// Identifies a single tool invocation.
    ToolEventId
);
