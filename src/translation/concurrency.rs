/*!
 * Concurrency and retry controls for provider calls.
 *
 * - `CallLimiter` bounds in-flight provider calls with a shared semaphore and
 *   applies the per-call timeout
 * - `RetryPolicy` and `with_retry` re-issue retryable failures with exponential
 *   backoff and jitter
 */

use log::{debug, warn};
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::errors::{ProviderError, TranslationError};

/// Retry settings for a single provider call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each later retry
    pub base_backoff: Duration,
    /// Add up to half the delay of random jitter
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_backoff: Duration::from_millis(1000),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given retry count and base backoff
    pub fn new(max_retries: u32, base_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            base_backoff: Duration::from_millis(base_backoff_ms),
            jitter: true,
        }
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_backoff: Duration::ZERO,
            jitter: false,
        }
    }

    /// Delay before retry number `retry` (0-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let base_ms = self.base_backoff.as_millis() as u64;
        let delay_ms = base_ms.saturating_mul(1u64 << retry.min(16));

        let jitter_ms = if self.jitter && delay_ms > 1 {
            rand::rng().random_range(0..=delay_ms / 2)
        } else {
            0
        };

        Duration::from_millis(delay_ms.saturating_add(jitter_ms))
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or the
/// retries are spent. Returns the final result and the number of attempts made.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> (Result<T, TranslationError>, u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TranslationError>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return (Ok(value), attempt),
            Err(e) if e.is_retryable() && attempt <= policy.max_retries => {
                let delay = policy.delay_for(attempt - 1);
                warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    label,
                    attempt,
                    policy.max_retries + 1,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                debug!("{} gave up after {} attempt(s)", label, attempt);
                return (Err(e), attempt);
            }
        }
    }
}

/// Shared bound on in-flight provider calls
#[derive(Debug, Clone)]
pub struct CallLimiter {
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl CallLimiter {
    /// Allow at most `max_in_flight` concurrent calls, each bounded by `timeout`
    pub fn new(max_in_flight: usize, timeout: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_in_flight.max(1))),
            timeout,
        }
    }

    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Permits currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Run a fallible provider call under a permit and the timeout
    pub async fn call<T, Fut>(&self, call: Fut) -> Result<T, TranslationError>
    where
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let _permit = self.semaphore.acquire().await.map_err(|_| {
            TranslationError::Provider(ProviderError::RequestFailed("call limiter closed".to_string()))
        })?;

        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(TranslationError::from),
            Err(_) => Err(TranslationError::Timeout(format!(
                "no response within {:?}",
                self.timeout
            ))),
        }
    }

    /// Run an infallible call under a permit and the timeout; `None` on timeout
    pub async fn bounded<T, Fut>(&self, call: Fut) -> Option<T>
    where
        Fut: Future<Output = T>,
    {
        let _permit = self.semaphore.acquire().await.ok()?;
        tokio::time::timeout(self.timeout, call).await.ok()
    }
}
