//! Capped retry for read requests
//!
//! GET requests are retried with exponential backoff unless the failure is a
//! not-found. Mutations never go through here: a failed write is reported to
//! the caller as is.

use crate::core::error::ApiError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry decision and delay schedule for reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first failure
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    /// A policy that gives up on the first failure
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Whether to try again after `retries` retries have already failed
    pub fn should_retry(&self, retries: u32, error: &ApiError) -> bool {
        !error.is_not_found() && retries < self.max_retries
    }

    /// Delay before retry number `retries + 1`
    pub fn delay(&self, retries: u32) -> Duration {
        let factor = 2_u32.saturating_pow(retries);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `attempt` until it succeeds or the policy gives up
    pub async fn run<T, F, Fut>(&self, path: &str, mut attempt: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut retries = 0;
        loop {
            match attempt().await {
                Ok(value) => {
                    if retries > 0 {
                        debug!(path, retries, "request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if self.should_retry(retries, &e) => {
                    let backoff = self.delay(retries);
                    retries += 1;
                    warn!(
                        path,
                        attempt = retries,
                        max_retries = self.max_retries,
                        error = %e,
                        "read failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[test]
    fn test_should_retry_stops_at_limit() {
        let policy = RetryPolicy::default();
        let err = ApiError::transport("reset");
        assert!(policy.should_retry(0, &err));
        assert!(policy.should_retry(2, &err));
        assert!(!policy.should_retry(3, &err));
    }

    #[test]
    fn test_should_retry_never_on_not_found() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(0, &ApiError::NotFound { detail: None }));
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(2), Duration::from_secs(4));
        assert_eq!(policy.delay(10), Duration::from_secs(30));
        assert_eq!(policy.delay(64), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_run_retries_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = fast()
            .run("/products/", || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(ApiError::transport("timeout"))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = fast()
            .run("/products/", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(ApiError::Status { status: 503, detail: None }) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_run_does_not_retry_not_found() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = fast()
            .run("/products/9/", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(ApiError::NotFound { detail: None }) }
            })
            .await;

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_none_policy_fails_fast() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let _ = RetryPolicy::none()
            .run::<(), _, _>("/products/", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(ApiError::transport("down")) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
