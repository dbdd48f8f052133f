//! Retry with exponential back-off for persistent-store mutations.
//!
//! [`retry_with_backoff`] wraps any fallible async operation. It is
//! deliberately failure-agnostic: the store surfaces transient and permanent
//! errors through the same type, and the operation volume is low enough that
//! re-attempting a hopeless mutation a couple of times costs nothing. The
//! final attempt's error is returned to the caller unchanged — a persistent
//! failure is never swallowed here.

use std::future::Future;
use std::time::Duration;

/// Attempt budget and back-off base for [`retry_with_backoff`].
///
/// With the defaults the delays between attempts are 2 s, 4 s, 8 s, …
/// (doubling per attempt), capped at 60 s.
#[derive(Debug, Clone, Copy)]
pub struct RetrySettings {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each attempt after that.
    pub base_delay: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetrySettings {
    #[must_use]
    pub fn from_app_config(config: &vidlab_core::AppConfig) -> Self {
        Self {
            max_attempts: config.store_max_attempts.max(1),
            base_delay: Duration::from_secs(config.store_backoff_base_secs),
        }
    }
}

const MAX_DELAY: Duration = Duration::from_secs(60);

/// Runs `operation` up to `settings.max_attempts` times, sleeping between
/// attempts with an exponentially increasing delay.
///
/// # Errors
///
/// Returns the error from the final attempt once the budget is exhausted.
pub async fn retry_with_backoff<T, E, F, Fut>(
    settings: RetrySettings,
    mut operation: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = settings.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_attempts {
                    return Err(err);
                }
                let delay = settings
                    .base_delay
                    .saturating_mul(1u32 << (attempt - 1).min(10))
                    .min(MAX_DELAY);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "store operation failed — retrying after back-off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn immediate() -> RetrySettings {
        RetrySettings {
            max_attempts: 3,
            base_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(immediate(), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, std::io::Error>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fails_twice_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(immediate(), || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(std::io::Error::other("transient"))
                } else {
                    Ok(99u32)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99, "should succeed after retries");
        assert_eq!(
            calls.load(Ordering::SeqCst),
            3,
            "should have been called 3 times (2 failures + 1 success)"
        );
    }

    #[tokio::test]
    async fn always_failing_returns_error_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<u32, std::io::Error> = retry_with_backoff(immediate(), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(std::io::Error::other("persistent"))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "persistent", "original error is re-raised");
    }

    #[tokio::test]
    async fn zero_max_attempts_still_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let settings = RetrySettings {
            max_attempts: 0,
            base_delay: Duration::ZERO,
        };
        let result = retry_with_backoff(settings, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, std::io::Error>(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
