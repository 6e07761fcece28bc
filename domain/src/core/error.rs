//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid consensus configuration: {0}")]
    InvalidConsensus(String),

    #[error("Query already fixed for this iteration group")]
    QueryLocked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tool_display() {
        let error = DomainError::UnknownTool("warp_drive".to_string());
        assert_eq!(error.to_string(), "Unknown tool: warp_drive");
    }

    #[test]
    fn test_invalid_consensus_display() {
        let error = DomainError::InvalidConsensus("min_matches is 0".to_string());
        assert!(error.to_string().contains("min_matches is 0"));
    }
}
