//! Connection resiliency for the catalog store.
//!
//! Transient failures (dropped sockets, pool exhaustion, server restarts) are
//! retried with a capped exponential back-off. Anything else surfaces on the
//! first failure.

use std::{fmt::Display, future::Future, time::Duration};

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{CatalogError, Result};

pub const DEFAULT_MAX_RETRY_COUNT: u32 = 15;
pub const DEFAULT_MAX_RETRY_DELAY: Duration = Duration::from_secs(30);
pub const DEFAULT_BASE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Classifies errors that are worth another attempt.
pub trait TransientError: Display {
    fn is_transient(&self) -> bool;
}

impl TransientError for sqlx::Error {
    fn is_transient(&self) -> bool {
        match self {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut => true,
            sqlx::Error::Database(db) => db
                .code()
                .is_some_and(|code| is_transient_sqlstate(code.as_ref())),
            _ => false,
        }
    }
}

/// SQLSTATE codes that indicate the server or connection, not the statement,
/// was at fault.
fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08")
        || code.starts_with("53")
        || matches!(code, "57P01" | "57P02" | "57P03" | "40001" | "40P01")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retry_count: u32,
    max_retry_delay: Duration,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retry_count: DEFAULT_MAX_RETRY_COUNT,
            max_retry_delay: DEFAULT_MAX_RETRY_DELAY,
            base_delay: DEFAULT_BASE_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retry_count: u32, max_retry_delay: Duration) -> Self {
        Self {
            max_retry_count,
            max_retry_delay,
            ..Self::default()
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// A policy that never retries; used by tools that want the raw failure.
    pub fn no_retry() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_retry_count(&self) -> u32 {
        self.max_retry_count
    }

    pub fn max_retry_delay(&self) -> Duration {
        self.max_retry_delay
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Back-off before retry number `retry` (1-based):
    /// `base * (2^retry - 1) * jitter`, jitter in `[1.0, 1.1)`, capped at the
    /// maximum delay.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let growth = 2f64.powi(retry.min(32) as i32) - 1.0;
        let jitter: f64 = rand::rng().random_range(1.0..1.1);
        let secs = self.base_delay.as_secs_f64() * growth * jitter;
        let capped = secs.min(self.max_retry_delay.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    /// Run `attempt` until it succeeds, fails with a non-transient error, the
    /// retry budget runs out, or `cancel` fires.
    pub async fn execute<T, E, F, Fut>(
        &self,
        operation: &'static str,
        cancel: &CancellationToken,
        mut attempt: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: TransientError,
    {
        let mut retries = 0u32;

        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(CatalogError::cancelled(operation)),
                outcome = attempt() => outcome,
            };

            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_transient() {
                return Err(CatalogError::Database(format!("{operation}: {err}")));
            }

            if retries >= self.max_retry_count {
                return Err(CatalogError::Connectivity {
                    attempts: retries + 1,
                    message: format!("{operation}: {err}"),
                });
            }

            retries += 1;
            let delay = self.delay_for(retries);
            warn!(
                operation,
                retry = retries,
                max_retries = self.max_retry_count,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "transient catalog store failure; retrying"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(CatalogError::cancelled(operation)),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        fmt,
        sync::atomic::{AtomicU32, Ordering},
    };

    #[derive(Debug)]
    enum FakeError {
        ConnectionReset,
        SyntaxError,
    }

    impl fmt::Display for FakeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                FakeError::ConnectionReset => write!(f, "connection reset by peer"),
                FakeError::SyntaxError => write!(f, "syntax error at or near SELEC"),
            }
        }
    }

    impl TransientError for FakeError {
        fn is_transient(&self) -> bool {
            matches!(self, FakeError::ConnectionReset)
        }
    }

    fn instant_policy() -> RetryPolicy {
        RetryPolicy::default().with_base_delay(Duration::ZERO)
    }

    async fn fail_times(
        policy: &RetryPolicy,
        failures: u32,
        calls: &AtomicU32,
    ) -> Result<&'static str> {
        let cancel = CancellationToken::new();
        policy
            .execute("test.op", &cancel, move || async move {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                if call < failures {
                    Err(FakeError::ConnectionReset)
                } else {
                    Ok("connected")
                }
            })
            .await
    }

    #[tokio::test]
    async fn recovers_after_fourteen_transient_failures() {
        let calls = AtomicU32::new(0);
        let value = fail_times(&instant_policy(), 14, &calls).await.unwrap();

        assert_eq!(value, "connected");
        assert_eq!(calls.load(Ordering::SeqCst), 15);
    }

    #[tokio::test]
    async fn gives_up_after_the_retry_budget() {
        let calls = AtomicU32::new(0);
        let err = fail_times(&instant_policy(), 16, &calls).await.unwrap_err();

        match err {
            CatalogError::Connectivity { attempts, message } => {
                assert_eq!(attempts, 16);
                assert!(message.contains("connection reset"), "{message}");
            }
            other => panic!("expected connectivity error, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 16);
    }

    #[tokio::test]
    async fn non_transient_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let cancel = CancellationToken::new();
        let err = instant_policy()
            .execute("test.op", &cancel, move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(FakeError::SyntaxError)
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Database(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_interrupts_back_off() {
        let policy = RetryPolicy::default().with_base_delay(Duration::from_secs(60));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = policy
            .execute("test.op", &cancel, || async {
                Err::<(), _>(FakeError::ConnectionReset)
            })
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
    }

    #[test]
    fn delay_grows_and_is_capped() {
        let policy = RetryPolicy::default();
        let first = policy.delay_for(1);
        assert!(first >= Duration::from_secs(1) && first < Duration::from_millis(1100));

        let third = policy.delay_for(3);
        assert!(third >= Duration::from_secs(7) && third < Duration::from_millis(7700));

        assert_eq!(policy.delay_for(10), DEFAULT_MAX_RETRY_DELAY);
        assert_eq!(policy.delay_for(u32::MAX), DEFAULT_MAX_RETRY_DELAY);
    }

    #[test]
    fn sqlstate_classification() {
        assert!(is_transient_sqlstate("08006"));
        assert!(is_transient_sqlstate("53300"));
        assert!(is_transient_sqlstate("57P01"));
        assert!(is_transient_sqlstate("40001"));
        assert!(!is_transient_sqlstate("23505"));
        assert!(!is_transient_sqlstate("42601"));
        assert!(sqlx::Error::PoolTimedOut.is_transient());
        assert!(!sqlx::Error::RowNotFound.is_transient());
    }
}
