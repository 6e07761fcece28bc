//! Sampling policy
//!
//! Maps an attempt index to generation parameters. Consensus samples use the
//! query index as the attempt, retries of a single call use the retry index,
//! so every repeated query explores a slightly different region of the
//! generator's output distribution.

use serde::{Deserialize, Serialize};

const TEMPERATURES: [f32; 5] = [0.1, 0.4, 0.7, 0.9, 1.2];
const TOP_P: [f32; 3] = [0.9, 0.95, 1.0];
const TOP_K: [u32; 4] = [40, 60, 80, 100];

/// Generation knobs for a single call. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

impl SamplingParams {
    /// Parameters for the given attempt.
    ///
    /// Total over every `usize`: each table is indexed modulo its length.
    /// The table lengths are pairwise coprime, so a combination repeats
    /// only every 60 attempts.
    ///
    /// ```
    /// use helm_domain::SamplingParams;
    ///
    /// let first = SamplingParams::for_attempt(0, &[]);
    /// assert_eq!(first.temperature, 0.1);
    /// assert_eq!(SamplingParams::for_attempt(usize::MAX, &[]).stop.len(), 0);
    /// ```
    pub fn for_attempt(attempt: usize, stop: &[String]) -> Self {
        Self {
            temperature: TEMPERATURES[attempt % TEMPERATURES.len()],
            top_p: TOP_P[attempt % TOP_P.len()],
            top_k: TOP_K[attempt % TOP_K.len()],
            stop: stop.to_vec(),
        }
    }

    /// Parameters for a single deterministic-leaning call.
    pub fn initial() -> Self {
        Self::for_attempt(0, &[])
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::initial()
    }
}

/// Stop markers that cut a reply at the first newline.
pub fn stop_on_newline() -> Vec<String> {
    vec!["\n".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = SamplingParams::for_attempt(3, &[]);
        let b = SamplingParams::for_attempt(3, &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_attempts_vary() {
        let a = SamplingParams::for_attempt(0, &[]);
        let b = SamplingParams::for_attempt(1, &[]);
        assert_ne!(a, b);
        assert!(b.temperature > a.temperature);
    }

    #[test]
    fn test_wraps_for_large_attempts() {
        let p = SamplingParams::for_attempt(usize::MAX, &[]);
        assert!(TEMPERATURES.contains(&p.temperature));
        assert!(TOP_P.contains(&p.top_p));
        assert!(TOP_K.contains(&p.top_k));

        assert_eq!(
            SamplingParams::for_attempt(5, &[]).temperature,
            SamplingParams::for_attempt(0, &[]).temperature
        );
    }

    #[test]
    fn test_stop_markers_carried() {
        let p = SamplingParams::for_attempt(2, &stop_on_newline());
        assert_eq!(p.stop, vec!["\n".to_string()]);
    }
}
