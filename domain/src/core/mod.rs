//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`ids`]: identifiers for turns, iteration groups and tool events
//! - [`string`]: text helpers used by prompts and reply parsers

pub mod error;
pub mod ids;
pub mod string;
