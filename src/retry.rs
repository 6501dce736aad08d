//! Fixed-count retry with backoff.
//!
//! The policy is plain data (attempt cap + backoff shape); which errors are
//! worth retrying is decided per call by a predicate, so one policy serves
//! every integration.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Delay before the next attempt, as a function of the attempt that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Retry immediately.
    None,
    /// `step × attempt`: 1 s, 2 s, 3 s … for a one-second step.
    Linear(Duration),
}

impl Backoff {
    /// Delay after the 1-based `attempt` failed.
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Self::None => Duration::ZERO,
            Self::Linear(step) => step.saturating_mul(attempt),
        }
    }
}

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. `0` is treated as `1`.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

/// The last error once a policy gives up.
#[derive(Debug)]
pub struct Exhausted<E> {
    /// Attempts actually made.
    pub attempts: u32,
    pub error: E,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self { max_attempts, backoff }
    }

    /// Runs `op` until it succeeds, fails with an error `retryable` rejects,
    /// or the attempt cap is reached. Sleeps `backoff.delay(n)` after the
    /// n-th failed attempt when another attempt follows.
    pub async fn run<T, E, F, Fut, P>(&self, what: &str, mut op: F, retryable: P) -> Result<T, Exhausted<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(what, attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) if attempt < max_attempts && retryable(&error) => {
                    let delay = self.backoff.delay(attempt);
                    warn!(
                        what,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    warn!(what, attempt, error = %error, "giving up");
                    return Err(Exhausted { attempts: attempt, error });
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    /// Three attempts, linear one-second backoff (waits of 1 s then 2 s).
    fn default() -> Self {
        Self::new(3, Backoff::Linear(Duration::from_secs(1)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;

    #[derive(Debug, PartialEq)]
    enum Fail {
        Transient,
        Permanent,
    }

    impl Display for Fail {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    fn is_transient(e: &Fail) -> bool {
        *e == Fail::Transient
    }

    #[test]
    fn linear_backoff_grows_with_attempts() {
        let b = Backoff::Linear(Duration::from_secs(1));
        assert_eq!(b.delay(1), Duration::from_secs(1));
        assert_eq!(b.delay(2), Duration::from_secs(2));
        assert_eq!(Backoff::None.delay(3), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt_after_one_and_two_seconds() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result = RetryPolicy::default()
            .run(
                "flaky",
                || async {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    if n < 3 { Err(Fail::Transient) } else { Ok(n) }
                },
                is_transient,
            )
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(3) && waited < Duration::from_millis(3100), "{waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let err = RetryPolicy::default()
            .run(
                "down",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(Fail::Transient)
                },
                is_transient,
            )
            .await
            .unwrap_err();

        assert_eq!(err.attempts, 3);
        assert_eq!(err.error, Fail::Transient);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);

        let err = RetryPolicy::default()
            .run(
                "rejected",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(Fail::Permanent)
                },
                is_transient,
            )
            .await
            .unwrap_err();

        assert_eq!(err.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let _ = RetryPolicy::new(0, Backoff::None)
            .run(
                "zero",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(Fail::Transient)
                },
                is_transient,
            )
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
