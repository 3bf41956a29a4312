//! Bounded retry with linear backoff
//!
//! [`RetryPolicy`] runs an async operation up to `max_retries + 1` times.
//! The n-th retry waits `n * base_delay` first (1x, 2x, 3x, ...), so delays
//! grow strictly. Waits are timer-driven: other tasks keep running while a
//! retry is pending, and a [`CancellationToken`] aborts both an in-flight
//! attempt and a pending wait. The loop resolves exactly once, with either
//! the first success or a [`RetryError`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use skillpass_core::RetrySettings;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::RetryError;
use crate::observer::{RetryEvent, RetryObserver};

/// Linear backoff: retry `n` (1-based) waits `n * base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearBackoff {
    base: Duration,
}

impl LinearBackoff {
    /// Backoff with the given base delay.
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay(&self, retry: u32) -> Duration {
        self.base.saturating_mul(retry)
    }
}

/// Statistics of a completed retry loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryStats {
    /// Attempts made, the successful one included.
    pub attempts: u32,
    /// Delays waited between attempts.
    pub delays: Vec<Duration>,
    /// Wall time from the first attempt to resolution.
    pub elapsed: Duration,
}

/// Retry policy for ledger reads.
#[derive(Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: LinearBackoff,
    observers: Vec<Arc<dyn RetryObserver>>,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for RetryPolicy {
    /// Three retries, one second base delay.
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// Policy with `max_retries` retries after the first attempt.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            backoff: LinearBackoff::new(base_delay),
            observers: Vec::new(),
        }
    }

    /// Policy from the `[retry]` configuration section.
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(settings.max_retries, settings.base_delay())
    }

    /// Adds an observer that receives every [`RetryEvent`].
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Attempts allowed, the first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// The backoff schedule.
    pub fn backoff(&self) -> LinearBackoff {
        self.backoff
    }

    /// Runs `operation` until it succeeds, attempts run out, or `cancel`
    /// fires.
    pub async fn execute<T, E, F, Fut>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.execute_with_stats(operation, cancel, op)
            .await
            .map(|(value, _)| value)
    }

    /// Same as [`execute`](Self::execute), also returning loop statistics.
    pub async fn execute_with_stats<T, E, F, Fut>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<(T, RetryStats), RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let started = Instant::now();
        let max_attempts = self.max_attempts();
        let mut delays = Vec::new();
        let mut attempt = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(self.cancelled(operation, attempt));
            }
            attempt += 1;
            debug!(operation, attempt, max_attempts, "starting attempt");

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(self.cancelled(operation, attempt)),
                outcome = op() => outcome,
            };

            let error = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        info!(operation, attempts = attempt, "succeeded after retry");
                    }
                    self.notify(&RetryEvent::Succeeded {
                        operation: operation.to_string(),
                        attempts: attempt,
                    });
                    let stats = RetryStats {
                        attempts: attempt,
                        delays,
                        elapsed: started.elapsed(),
                    };
                    return Ok((value, stats));
                }
                Err(error) => error,
            };

            if attempt >= max_attempts {
                warn!(operation, attempts = attempt, error = %error, "retries exhausted");
                self.notify(&RetryEvent::Exhausted {
                    operation: operation.to_string(),
                    attempts: attempt,
                    error: error.to_string(),
                });
                return Err(RetryError::Exhausted {
                    operation: operation.to_string(),
                    attempts: attempt,
                    last: error,
                });
            }

            let delay = self.backoff.delay(attempt);
            info!(
                operation,
                attempt,
                max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %error,
                "attempt failed, retrying"
            );
            self.notify(&RetryEvent::Retrying {
                operation: operation.to_string(),
                attempt,
                max_attempts,
                delay,
                error: error.to_string(),
            });
            delays.push(delay);

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(self.cancelled(operation, attempt)),
                () = sleep(delay) => {}
            }
        }
    }

    fn cancelled<E>(&self, operation: &str, attempts: u32) -> RetryError<E> {
        info!(operation, attempts, "retry loop cancelled");
        self.notify(&RetryEvent::Cancelled {
            operation: operation.to_string(),
            attempts,
        });
        RetryError::Cancelled {
            operation: operation.to_string(),
            attempts,
        }
    }

    fn notify(&self, event: &RetryEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::EventLog;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn linear_backoff_grows_by_base() {
        let backoff = LinearBackoff::new(Duration::from_millis(1000));
        assert_eq!(backoff.delay(1), Duration::from_secs(1));
        assert_eq!(backoff.delay(2), Duration::from_secs(2));
        assert_eq!(backoff.delay(3), Duration::from_secs(3));
    }

    #[test]
    fn defaults_allow_four_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(
            RetryPolicy::from_settings(&RetrySettings::default()).max_attempts(),
            4
        );
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn first_success_needs_no_delay() {
        let policy = RetryPolicy::default();
        let (value, stats) = policy
            .execute_with_stats("read", &CancellationToken::new(), || async {
                Ok::<_, String>(7)
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(stats.attempts, 1);
        assert!(stats.delays.is_empty());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn succeeds_on_fourth_attempt_after_three_growing_delays() {
        let log = EventLog::new();
        let policy = RetryPolicy::default().with_observer(Arc::new(log.clone()));
        let calls = AtomicU32::new(0);

        let started = tokio::time::Instant::now();
        let (value, stats) = policy
            .execute_with_stats("read", &CancellationToken::new(), || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 3 {
                        Err(format!("failure {n}"))
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(stats.attempts, 4);

        let delays = log.delays();
        assert_eq!(delays.len(), 3);
        assert!(delays.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(stats.delays, delays);
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn gives_up_after_four_attempts() {
        let log = EventLog::new();
        let policy = RetryPolicy::default().with_observer(Arc::new(log.clone()));
        let calls = AtomicU32::new(0);

        let err = policy
            .execute("read", &CancellationToken::new(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>("node unreachable") }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(err.attempts(), 4);
        assert!(err.to_string().contains("retries exhausted"));
        assert!(matches!(
            log.events().last(),
            Some(RetryEvent::Exhausted { attempts: 4, .. })
        ));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn cancellation_during_backoff_stops_further_attempts() {
        let policy = RetryPolicy::default();
        let cancel = CancellationToken::new();
        let calls = Arc::new(AtomicU32::new(0));

        let handle = {
            let cancel = cancel.clone();
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                policy
                    .execute("read", &cancel, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        async { Err::<(), _>("down") }
                    })
                    .await
            })
        };

        // First attempt fails immediately, then a 1s wait starts.
        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.cancel();

        let err = handle.await.unwrap().unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn already_cancelled_token_makes_no_attempt() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = AtomicU32::new(0);

        let err = RetryPolicy::default()
            .execute("read", &cancel, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, String>(()) }
            })
            .await
            .unwrap_err();

        assert_eq!(err.attempts(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
