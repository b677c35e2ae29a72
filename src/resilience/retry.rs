//! Bounded retry wrapper for calls to external services.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::defaults;

/// Retry limits for one external dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    name: String,
    max_retries: u32,
    delay: Duration,
}

/// How a retried call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    Succeeded { value: T, attempts: u32 },
    /// Every allowed attempt failed with a retryable error
    Exhausted { last_error: E, attempts: u32 },
    /// A failure the predicate refused to retry
    Rejected { error: E, attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. }
            | Self::Exhausted { attempts, .. }
            | Self::Rejected { attempts, .. } => *attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Succeeded { value, .. } => Ok(value),
            Self::Exhausted { last_error, .. } => Err(last_error),
            Self::Rejected { error, .. } => Err(error),
        }
    }

    /// Replace any failure with a value derived from the final error
    pub fn or_fallback(self, fallback: impl FnOnce(E) -> T) -> T {
        self.into_result().unwrap_or_else(fallback)
    }
}

impl RetryPolicy {
    pub fn new(name: impl Into<String>, max_retries: u32) -> Self {
        Self {
            name: name.into(),
            max_retries,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// First attempt plus retries
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `operation` until it succeeds, the predicate rejects its error, or the
    /// attempt budget is spent. The operation receives the 1-based attempt number.
    pub async fn execute<F, Fut, T, E, P>(&self, mut operation: F, should_retry: P) -> RetryOutcome<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(policy = %self.name, attempts = attempt, "✅ Call succeeded after retry");
                    }
                    return RetryOutcome::Succeeded {
                        value,
                        attempts: attempt,
                    };
                }
                Err(error) if !should_retry(&error) => {
                    debug!(policy = %self.name, attempt, error = %error, "Non-retryable failure");
                    return RetryOutcome::Rejected {
                        error,
                        attempts: attempt,
                    };
                }
                Err(error) if attempt >= max_attempts => {
                    warn!(
                        policy = %self.name,
                        attempts = attempt,
                        error = %error,
                        "❌ Retries exhausted"
                    );
                    return RetryOutcome::Exhausted {
                        last_error: error,
                        attempts: attempt,
                    };
                }
                Err(error) => {
                    warn!(
                        policy = %self.name,
                        retry = attempt,
                        max_retries = self.max_retries,
                        error = %error,
                        "🔄 Retryable failure, trying again"
                    );
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new("default", defaults::MAX_RETRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, PartialEq)]
    enum Failure {
        Transient,
        Permanent,
    }

    impl std::fmt::Display for Failure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    fn is_transient(failure: &Failure) -> bool {
        matches!(failure, Failure::Transient)
    }

    #[tokio::test]
    async fn test_succeeds_on_final_attempt() {
        let policy = RetryPolicy::new("classifier", 5);
        let calls = AtomicU32::new(0);

        let outcome = policy
            .execute(
                |attempt| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if attempt <= 5 {
                            Err(Failure::Transient)
                        } else {
                            Ok("Pdf")
                        }
                    }
                },
                is_transient,
            )
            .await;

        assert_eq!(outcome, RetryOutcome::Succeeded { value: "Pdf", attempts: 6 });
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_exhaustion_falls_back() {
        let policy = RetryPolicy::new("classifier", 5);
        let calls = AtomicU32::new(0);

        let outcome = policy
            .execute(
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err::<&str, _>(Failure::Transient) }
                },
                is_transient,
            )
            .await;

        assert_eq!(outcome.attempts(), 6);
        assert!(matches!(outcome, RetryOutcome::Exhausted { .. }));
        assert_eq!(outcome.or_fallback(|_| "Error"), "Error");
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_non_retryable_failure_stops_immediately() {
        let policy = RetryPolicy::new("rebuilder", 5);
        let calls = AtomicU32::new(0);

        let outcome = policy
            .execute(
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err::<(), _>(Failure::Permanent) }
                },
                is_transient,
            )
            .await;

        assert_eq!(
            outcome,
            RetryOutcome::Rejected {
                error: Failure::Permanent,
                attempts: 1
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let policy = RetryPolicy::new("single", 0);
        let outcome = policy
            .execute(|_| async { Err::<(), _>(Failure::Transient) }, is_transient)
            .await;

        assert_eq!(outcome.attempts(), 1);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_default_policy_allows_six_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries(), 5);
        assert_eq!(policy.max_attempts(), 6);
    }
}
