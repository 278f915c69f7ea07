//! Bounded exponential backoff for transient backend failures.

use crate::error::EngineError;
use alfred_config::RetryConfig;
use log::{debug, warn};
use std::future::Future;
use std::time::Duration;

/// Retry policy applied to retryable backend errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum attempts including the initial call.
    pub max_attempts: u32,
    /// Base delay, doubled per attempt.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Build a policy from config.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }

    /// Backoff delay before the given retry (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

impl Default for RetryPolicy {
    /// Default policy matching config defaults.
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Run an operation, retrying retryable errors with exponential backoff.
///
/// Non-retryable errors propagate immediately; the last error is returned
/// once the attempt cap is reached.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EngineError>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt + 1 < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "backend call failed, retrying (attempt={}, delay_ms={}, error={})",
                    attempt + 1,
                    delay.as_millis(),
                    err
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                debug!(
                    "backend call giving up (attempts={}, retryable={})",
                    attempt + 1,
                    err.is_retryable()
                );
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RetryPolicy, with_retry};
    use crate::error::EngineError;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn retries_unavailable_until_cap() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(fast_policy(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(EngineError::Unavailable("down".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn protocol_errors_propagate_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(fast_policy(5), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(EngineError::Protocol("bad json".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = with_retry(fast_policy(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(EngineError::Unavailable("blip".into()))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;
        assert_eq!(result.expect("value"), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let policy = fast_policy(4);
        assert_eq!(policy.delay_for(0), Duration::from_millis(1));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4));
    }
}
