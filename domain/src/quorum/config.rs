//! Consensus configuration

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How two samples are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Structural equality (`PartialEq`)
    #[default]
    Exact,
    /// Caller-supplied equivalence predicate
    Some,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Exact => "exact",
            MatchMode::Some => "some",
        }
    }
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" | "equal" => Ok(MatchMode::Exact),
            "some" | "equivalent" => Ok(MatchMode::Some),
            _ => Err(format!("Invalid match mode: {}", s)),
        }
    }
}

/// Budget and agreement threshold for one consensus query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Upper bound on generator calls
    pub max_queries: usize,
    /// Agreeing samples (including the candidate itself) needed to exit early
    pub min_matches: usize,
    pub match_mode: MatchMode,
    /// Stop markers forwarded to every sample's sampling params
    #[serde(default)]
    pub stop: Vec<String>,
    /// Issue all queries concurrently instead of one after another
    #[serde(default)]
    pub parallel: bool,
}

impl ConsensusConfig {
    pub fn new(max_queries: usize, min_matches: usize) -> Self {
        Self {
            max_queries,
            min_matches,
            match_mode: MatchMode::Exact,
            stop: Vec::new(),
            parallel: false,
        }
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_queries == 0 {
            return Err(DomainError::InvalidConsensus(
                "max_queries must be at least 1".to_string(),
            ));
        }
        if self.min_matches == 0 {
            return Err(DomainError::InvalidConsensus(
                "min_matches must be at least 1".to_string(),
            ));
        }
        if self.min_matches > self.max_queries {
            return Err(DomainError::InvalidConsensus(format!(
                "min_matches ({}) exceeds max_queries ({})",
                self.min_matches, self.max_queries
            )));
        }
        Ok(())
    }
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self::new(3, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_mode_from_str() {
        assert_eq!("exact".parse::<MatchMode>().unwrap(), MatchMode::Exact);
        assert_eq!("SOME".parse::<MatchMode>().unwrap(), MatchMode::Some);
        assert!("fuzzy".parse::<MatchMode>().is_err());
    }

    #[test]
    fn test_builder() {
        let config = ConsensusConfig::new(7, 2)
            .with_match_mode(MatchMode::Some)
            .with_stop(vec!["\n".to_string()])
            .with_parallel(true);
        assert_eq!(config.max_queries, 7);
        assert_eq!(config.match_mode, MatchMode::Some);
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_budgets() {
        assert!(ConsensusConfig::new(0, 0).validate().is_err());
        assert!(ConsensusConfig::new(3, 0).validate().is_err());
        assert!(ConsensusConfig::new(2, 3).validate().is_err());
        assert!(ConsensusConfig::new(3, 3).validate().is_ok());
    }
}
