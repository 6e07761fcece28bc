//! Consensus tally and result

use super::config::MatchMode;
use serde::{Deserialize, Serialize};

/// Pick the sample with the most equivalent peers.
///
/// Returns `(index, count)` where `count` includes the sample itself. On a
/// tie the earliest sample wins. `None` only for an empty slice.
pub fn tally<T>(samples: &[T], equivalent: impl Fn(&T, &T) -> bool) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for (i, candidate) in samples.iter().enumerate() {
        let count = samples.iter().filter(|s| equivalent(candidate, s)).count();
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((i, count)),
        }
    }
    best
}

/// Compare two samples under the configured mode.
pub fn samples_match<T: PartialEq>(
    mode: MatchMode,
    a: &T,
    b: &T,
    equivalent: &impl Fn(&T, &T) -> bool,
) -> bool {
    match mode {
        MatchMode::Exact => a == b,
        MatchMode::Some => equivalent(a, b),
    }
}

/// Outcome of a consensus query.
///
/// `match_count` is the number of entries in `all_results` equivalent to
/// `result`; it is zero exactly when `result` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult<T> {
    pub result: Option<T>,
    pub match_count: usize,
    pub queries_run: usize,
    pub all_results: Vec<T>,
}

impl<T: Clone> ConsensusResult<T> {
    /// Build a result from the collected samples.
    pub fn from_samples(
        all_results: Vec<T>,
        queries_run: usize,
        equivalent: impl Fn(&T, &T) -> bool,
    ) -> Self {
        match tally(&all_results, equivalent) {
            Some((index, match_count)) => Self {
                result: Some(all_results[index].clone()),
                match_count,
                queries_run,
                all_results,
            },
            None => Self::empty(queries_run),
        }
    }
}

impl<T> ConsensusResult<T> {
    /// No usable sample was produced.
    pub fn empty(queries_run: usize) -> Self {
        Self {
            result: None,
            match_count: 0,
            queries_run,
            all_results: Vec::new(),
        }
    }

    /// Whether the agreement threshold was met.
    pub fn reached(&self, min_matches: usize) -> bool {
        self.result.is_some() && self.match_count >= min_matches
    }

    pub fn sample_count(&self) -> usize {
        self.all_results.len()
    }
}
