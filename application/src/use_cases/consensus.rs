//! Consensus engine
//!
//! Issues up to `max_queries` independent queries, each with its own
//! [`SamplingParams`], and returns the most agreed-upon sample. As soon as
//! a candidate has `min_matches` equivalent peers the remaining queries are
//! skipped (sequential mode) or dropped (parallel mode).
//!
//! A query returning `None` (timeout, transport failure, unparsable
//! reply) is simply a missing sample.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use helm_domain::{ConsensusConfig, ConsensusResult, SamplingParams, samples_match, tally};
use std::future::Future;
use tracing::debug;

/// Run a consensus query.
///
/// `equivalent` is used when the config's match mode is
/// [`MatchMode::Some`](helm_domain::MatchMode::Some); exact mode compares
/// with `PartialEq`.
pub async fn run_with_consensus<T, F, Fut, Q>(
    mut query: F,
    equivalent: Q,
    config: &ConsensusConfig,
) -> ConsensusResult<T>
where
    T: Clone + PartialEq,
    F: FnMut(SamplingParams) -> Fut,
    Fut: Future<Output = Option<T>>,
    Q: Fn(&T, &T) -> bool,
{
    let mode = config.match_mode;
    let matches = |a: &T, b: &T| samples_match(mode, a, b, &equivalent);
    let reached = |samples: &[T]| {
        tally(samples, matches).is_some_and(|(_, count)| count >= config.min_matches)
    };

    let mut samples = Vec::new();
    let mut queries_run = 0;

    if config.parallel {
        let mut pending: FuturesUnordered<Fut> = (0..config.max_queries)
            .map(|i| query(SamplingParams::for_attempt(i, &config.stop)))
            .collect();
        while let Some(sample) = pending.next().await {
            queries_run += 1;
            if let Some(sample) = sample {
                samples.push(sample);
                if reached(&samples) {
                    debug!(queries_run, "Consensus reached early (parallel)");
                    break;
                }
            }
        }
    } else {
        for i in 0..config.max_queries {
            queries_run += 1;
            if let Some(sample) = query(SamplingParams::for_attempt(i, &config.stop)).await {
                samples.push(sample);
                if reached(&samples) {
                    debug!(queries_run, "Consensus reached early");
                    break;
                }
            }
        }
    }

    let result = ConsensusResult::from_samples(samples, queries_run, matches);
    debug!(
        queries_run = result.queries_run,
        samples = result.sample_count(),
        match_count = result.match_count,
        reached = result.reached(config.min_matches),
        "Consensus finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use helm_domain::MatchMode;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn scripted(samples: Vec<Option<&'static str>>) -> Mutex<VecDeque<Option<&'static str>>> {
        Mutex::new(samples.into())
    }

    fn exact(max: usize, min: usize) -> ConsensusConfig {
        ConsensusConfig::new(max, min)
    }

    #[tokio::test]
    async fn test_identical_samples_exit_after_min_matches() {
        let calls = AtomicUsize::new(0);
        let result = run_with_consensus(
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Some("lights_on") }
            },
            |a, b| a == b,
            &exact(5, 2),
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.result, Some("lights_on"));
        assert_eq!(result.match_count, 2);
        assert_eq!(result.queries_run, 2);
    }

    #[tokio::test]
    async fn test_identical_samples_with_full_quorum() {
        let result = run_with_consensus(|_| async { Some(7) }, |a, b| a == b, &exact(4, 4)).await;
        assert_eq!(result.match_count, 4);
        assert_eq!(result.queries_run, 4);
    }

    #[tokio::test]
    async fn test_two_of_three_agree() {
        let queue = scripted(vec![
            Some("circularize_orbit"),
            Some("none"),
            Some("circularize_orbit"),
        ]);
        let result = run_with_consensus(
            |_| {
                let next = queue.lock().unwrap().pop_front().flatten();
                async move { next }
            },
            |a, b| a == b,
            &exact(3, 2),
        )
        .await;
        assert_eq!(result.result, Some("circularize_orbit"));
        assert_eq!(result.match_count, 2);
        assert_eq!(result.queries_run, 3);
        assert_eq!(result.all_results.len(), 3);
    }

    #[tokio::test]
    async fn test_no_agreement_returns_first_best() {
        let queue = scripted(vec![Some("a"), Some("b"), Some("c")]);
        let result = run_with_consensus(
            |_| {
                let next = queue.lock().unwrap().pop_front().flatten();
                async move { next }
            },
            |a, b| a == b,
            &exact(3, 2),
        )
        .await;
        assert_eq!(result.result, Some("a"));
        assert_eq!(result.match_count, 1);
        assert!(result.match_count < 2);
        assert!(!result.reached(2));
    }

    #[tokio::test]
    async fn test_missing_samples_are_skipped() {
        let queue = scripted(vec![None, Some("x"), None, Some("x")]);
        let result = run_with_consensus(
            |_| {
                let next = queue.lock().unwrap().pop_front().flatten();
                async move { next }
            },
            |a, b| a == b,
            &exact(4, 2),
        )
        .await;
        assert_eq!(result.result, Some("x"));
        assert_eq!(result.queries_run, 4);
        assert_eq!(result.all_results, vec!["x", "x"]);
    }

    #[tokio::test]
    async fn test_all_missing() {
        let result: ConsensusResult<u8> =
            run_with_consensus(|_| async { None }, |a, b| a == b, &exact(3, 2)).await;
        assert!(result.result.is_none());
        assert_eq!(result.match_count, 0);
        assert_eq!(result.queries_run, 3);
    }

    #[tokio::test]
    async fn test_some_mode_uses_equivalence() {
        let queue = scripted(vec![Some("Which room?"), Some("What colour?")]);
        let config = exact(3, 2).with_match_mode(MatchMode::Some);
        let result = run_with_consensus(
            |_| {
                let next = queue.lock().unwrap().pop_front().flatten();
                async move { next }
            },
            |a: &&str, b: &&str| a.ends_with('?') && b.ends_with('?'),
            &config,
        )
        .await;
        assert_eq!(result.result, Some("Which room?"));
        assert_eq!(result.match_count, 2);
        assert_eq!(result.queries_run, 2);
    }

    #[tokio::test]
    async fn test_exact_mode_ignores_equivalence() {
        let result = run_with_consensus(
            |params| async move { Some((params.temperature * 10.0) as i32) },
            |_, _| true,
            &exact(3, 2),
        )
        .await;
        assert_eq!(result.match_count, 1);
        assert_eq!(result.queries_run, 3);
    }

    #[tokio::test]
    async fn test_sampling_params_vary_per_query() {
        let seen = Mutex::new(Vec::new());
        let config = exact(3, 3).with_stop(vec!["\n".to_string()]);
        run_with_consensus(
            |params| {
                seen.lock().unwrap().push(params.clone());
                async { Some(1) }
            },
            |a, b| a == b,
            &config,
        )
        .await;
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_ne!(seen[0], seen[1]);
        assert!(seen.iter().all(|p| p.stop == vec!["\n".to_string()]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_exits_early_and_drops_slow_queries() {
        let config = exact(3, 2).with_parallel(true);
        let result = run_with_consensus(
            |params| async move {
                // the third query is slow and must not be awaited
                if params.temperature > 0.5 {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Some("slow")
                } else {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Some("fast")
                }
            },
            |a, b| a == b,
            &config,
        )
        .await;
        assert_eq!(result.result, Some("fast"));
        assert_eq!(result.match_count, 2);
        assert_eq!(result.queries_run, 2);
    }
}
