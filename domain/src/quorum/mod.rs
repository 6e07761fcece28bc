//! Sample consensus
//!
//! A generator is queried several times with varied [`SamplingParams`] and the
//! answers are voted on. This module holds the pure side of that: the
//! configuration, the tally over collected samples and the result type. The
//! async driver that actually issues the queries lives in the application
//! layer.
//!
//! ```text
//! query 0 ─┐
//! query 1 ─┼─► samples ─► tally ─► count >= min_matches? ─► early exit
//! query n ─┘                              │
//!                                         └─► budget spent ─► best so far
//! ```
//!
//! This is best-effort majority voting over noisy answers, not a
//! fault-tolerant distributed protocol.
//!
//! [`SamplingParams`]: crate::SamplingParams

pub mod config;
pub mod consensus;

pub use config::{ConsensusConfig, MatchMode};
pub use consensus::{ConsensusResult, samples_match, tally};
