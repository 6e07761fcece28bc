//! Retry engine
//!
//! "Attempt up to `max_attempts` times, stop on the first acceptable
//! result, otherwise hand back the last result or error." Exhaustion is
//! never an error: every variant returns a [`RetryOutcome`] and the caller
//! decides whether it is fatal.
//!
//! Three shapes:
//!
//! | Method | Producer | Retries on |
//! |--------|----------|------------|
//! | [`Retry::on_result`] | `T` | `needs_retry(&T)` |
//! | [`Retry::on_error`] | `Result<T, E>` | retryable `E` |
//! | [`Retry::with_escalation`] | `Result<T, E>` from fresh [`SamplingParams`] | both |

use crate::ports::text_generator::GenerationError;
use helm_domain::SamplingParams;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Errors that may be worth another attempt.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for GenerationError {
    fn is_retryable(&self) -> bool {
        !self.is_cancelled()
    }
}

/// What a retry loop ended with.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryOutcome<T, E> {
    /// Last value produced, accepted or not
    pub value: Option<T>,
    /// Whether `value` passed the acceptance check
    pub accepted: bool,
    /// Attempts actually made
    pub attempts: usize,
    /// Last error captured, if any attempt failed
    pub last_error: Option<E>,
}

impl<T, E> RetryOutcome<T, E> {
    fn new() -> Self {
        Self {
            value: None,
            accepted: false,
            attempts: 0,
            last_error: None,
        }
    }

    /// The value, only if it was accepted.
    pub fn accepted_value(self) -> Option<T> {
        if self.accepted { self.value } else { None }
    }
}

type RetryHook<'a> = Box<dyn Fn(usize, &str) + Send + Sync + 'a>;

/// Retry policy
pub struct Retry<'a> {
    max_attempts: usize,
    delay: Option<Duration>,
    on_retry: Option<RetryHook<'a>>,
}

impl<'a> Retry<'a> {
    /// At least one attempt is always made.
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: None,
            on_retry: None,
        }
    }

    /// Fixed pause before each retry.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hook called before each retry with the upcoming attempt number
    /// (1-based) and the reason the previous attempt was rejected.
    pub fn on_retry(mut self, hook: impl Fn(usize, &str) + Send + Sync + 'a) -> Self {
        self.on_retry = Some(Box::new(hook));
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    async fn before_retry(&self, next_attempt: usize, reason: &str) {
        debug!(attempt = next_attempt, max = self.max_attempts, reason, "Retrying");
        if let Some(hook) = &self.on_retry {
            hook(next_attempt, reason);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// Retry while `needs_retry` returns a reason.
    pub async fn on_result<T, F, Fut, P>(&self, mut produce: F, needs_retry: P) -> RetryOutcome<T, ()>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = T>,
        P: Fn(&T) -> Option<String>,
    {
        let mut outcome = RetryOutcome::new();
        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let reason = outcome
                    .value
                    .as_ref()
                    .and_then(&needs_retry)
                    .unwrap_or_default();
                self.before_retry(attempt + 1, &reason).await;
            }
            let value = produce(attempt).await;
            outcome.attempts = attempt + 1;
            let rejected = needs_retry(&value).is_some();
            outcome.value = Some(value);
            if !rejected {
                outcome.accepted = true;
                break;
            }
        }
        outcome
    }

    /// Retry while the producer fails with a retryable error. A
    /// non-retryable error ends the loop at once.
    pub async fn on_error<T, E, F, Fut>(&self, mut produce: F) -> RetryOutcome<T, E>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let mut outcome = RetryOutcome::new();
        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let reason = outcome
                    .last_error
                    .as_ref()
                    .map(|e: &E| e.to_string())
                    .unwrap_or_default();
                self.before_retry(attempt + 1, &reason).await;
            }
            outcome.attempts = attempt + 1;
            match produce(attempt).await {
                Ok(value) => {
                    outcome.value = Some(value);
                    outcome.accepted = true;
                    outcome.last_error = None;
                    break;
                }
                Err(e) => {
                    let retryable = e.is_retryable();
                    outcome.last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }
        outcome
    }

    /// Retry with fresh sampling parameters per attempt until the producer
    /// returns an acceptable value.
    pub async fn with_escalation<T, E, F, Fut, P>(
        &self,
        stop: &[String],
        mut produce: F,
        needs_retry: P,
    ) -> RetryOutcome<T, E>
    where
        F: FnMut(SamplingParams) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
        P: Fn(&T) -> Option<String>,
    {
        let mut outcome = RetryOutcome::new();
        let mut reason = String::new();
        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                self.before_retry(attempt + 1, &reason).await;
            }
            outcome.attempts = attempt + 1;
            match produce(SamplingParams::for_attempt(attempt, stop)).await {
                Ok(value) => {
                    let rejection = needs_retry(&value);
                    outcome.value = Some(value);
                    match rejection {
                        None => {
                            outcome.accepted = true;
                            break;
                        }
                        Some(why) => reason = why,
                    }
                }
                Err(e) => {
                    reason = e.to_string();
                    let retryable = e.is_retryable();
                    outcome.last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Flaky(&'static str, bool);

    impl Display for Flaky {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl Retryable for Flaky {
        fn is_retryable(&self) -> bool {
            self.1
        }
    }

    #[tokio::test]
    async fn test_on_result_stops_on_first_acceptable() {
        let calls = AtomicUsize::new(0);
        let outcome = Retry::new(5)
            .on_result(
                |attempt| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move { if attempt < 2 { String::new() } else { "ok".to_string() } }
                },
                |s: &String| s.is_empty().then(|| "empty".to_string()),
            )
            .await;
        assert!(outcome.accepted);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.value.as_deref(), Some("ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_on_result_exhaustion_returns_last_value() {
        let reasons = Mutex::new(Vec::new());
        let outcome = Retry::new(3)
            .on_retry(|attempt, reason| reasons.lock().unwrap().push((attempt, reason.to_string())))
            .on_result(
                |attempt| async move { attempt },
                |_: &usize| Some("never good".to_string()),
            )
            .await;
        assert!(!outcome.accepted);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.value, Some(2));
        assert_eq!(
            *reasons.lock().unwrap(),
            vec![(2, "never good".to_string()), (3, "never good".to_string())]
        );
    }

    #[tokio::test]
    async fn test_on_error_never_escapes() {
        let calls = AtomicUsize::new(0);
        let outcome: RetryOutcome<(), Flaky> = Retry::new(4)
            .on_error(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Flaky("connection refused", true)) }
            })
            .await;
        assert!(outcome.value.is_none());
        assert!(!outcome.accepted);
        assert_eq!(outcome.attempts, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(outcome.last_error, Some(Flaky("connection refused", true)));
    }

    #[tokio::test]
    async fn test_on_error_recovers() {
        let outcome = Retry::new(3)
            .on_error(|attempt| async move {
                if attempt == 0 {
                    Err(Flaky("blip", true))
                } else {
                    Ok(attempt)
                }
            })
            .await;
        assert!(outcome.accepted);
        assert_eq!(outcome.value, Some(1));
        assert_eq!(outcome.attempts, 2);
        assert!(outcome.last_error.is_none());
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops() {
        let outcome: RetryOutcome<(), GenerationError> = Retry::new(5)
            .on_error(|_| async { Err(GenerationError::Cancelled) })
            .await;
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.last_error, Some(GenerationError::Cancelled));
    }

    #[tokio::test]
    async fn test_escalation_always_unacceptable_uses_every_attempt() {
        let seen = Mutex::new(Vec::new());
        let outcome: RetryOutcome<String, GenerationError> = Retry::new(3)
            .with_escalation(
                &[],
                |params| {
                    seen.lock().unwrap().push(params.temperature);
                    async { Ok("plain text".to_string()) }
                },
                |_| Some("no structured call".to_string()),
            )
            .await;
        assert_eq!(outcome.attempts, 3);
        assert!(!outcome.accepted);
        assert_eq!(outcome.value.as_deref(), Some("plain text"));

        let temperatures = seen.lock().unwrap().clone();
        assert_eq!(temperatures.len(), 3);
        assert!(temperatures.windows(2).all(|w| w[0] != w[1]));
    }

    #[tokio::test]
    async fn test_escalation_mixed_errors_and_values() {
        let outcome = Retry::new(3)
            .with_escalation(
                &["\n".to_string()],
                |params| async move {
                    assert_eq!(params.stop, vec!["\n".to_string()]);
                    if params.temperature < 0.2 {
                        Err(GenerationError::Timeout)
                    } else {
                        Ok(42)
                    }
                },
                |_| None,
            )
            .await;
        assert!(outcome.accepted);
        assert_eq!(outcome.value, Some(42));
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.last_error, Some(GenerationError::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_attempts() {
        let started = tokio::time::Instant::now();
        let _ = Retry::new(3)
            .with_delay(Duration::from_millis(500))
            .on_result(|_| async {}, |_| Some("again".to_string()))
            .await;
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[test]
    fn test_min_one_attempt() {
        assert_eq!(Retry::new(0).max_attempts(), 1);
    }
}
