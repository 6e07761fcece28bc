//! Turn lifecycle
//!
//! ```text
//! INTERPRET ──► SELECT_TOOL ──► EXECUTE ──► REFLECT_SUMMARIZE
//!   │   │                         ▲  ▲               │
//!   │   └──── exact tool name ────┘  │               │
//!   │                ▲               │               │
//!   │                └─────── continue ──────────────┘
//!   ▼
//! respond / ask          done / ask / ceiling ──► TurnOutput
//! ```

pub mod entities;
pub mod history;
pub mod working_state;

pub use entities::{InputOrigin, TurnBranch, TurnInput, TurnOutput, TurnState};
pub use history::{HistoryEntry, TurnHistory};
pub use working_state::TurnWorkingState;
