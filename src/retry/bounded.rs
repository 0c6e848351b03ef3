//! Exponential backoff with a fixed upper cap on each wait.

use std::time::Duration;

use super::error::ConfigError;
use super::exponential::ExponentialBackoffRetryPolicy;
use super::policy::RetryPolicy;
use crate::jitter::{JitterSource, ThreadJitter};

/// Exponential backoff whose waits never exceed `max_backoff`.
///
/// Retry permission is exactly that of [`ExponentialBackoffRetryPolicy`].
/// Waits are the same jittered exponential value, clamped to the cap, so they
/// always fall in `[base_backoff, max_backoff]`.
///
/// # Examples
///
/// ```rust
/// use backoff_policy::{BoundExponentialBackoffRetryPolicy, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = BoundExponentialBackoffRetryPolicy::new(
///     Duration::from_millis(100),
///     Duration::from_millis(500),
///     5,
/// )?;
///
/// let wait = policy.next_retry_wait(10, Duration::ZERO);
/// assert!(wait >= Duration::from_millis(100));
/// assert!(wait <= Duration::from_millis(500));
/// # Ok::<(), backoff_policy::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BoundExponentialBackoffRetryPolicy<J = ThreadJitter> {
    inner: ExponentialBackoffRetryPolicy<J>,
    max_backoff: Duration,
}

impl BoundExponentialBackoffRetryPolicy {
    /// Create a capped policy.
    ///
    /// Fails if `base_backoff` is zero or `max_backoff < base_backoff`.
    pub fn new(
        base_backoff: Duration,
        max_backoff: Duration,
        max_retries: u32,
    ) -> Result<Self, ConfigError> {
        let inner = ExponentialBackoffRetryPolicy::new(base_backoff, max_retries)?;
        Self::from_exponential(inner, max_backoff)
    }
}

impl<J: JitterSource> BoundExponentialBackoffRetryPolicy<J> {
    /// Cap an existing exponential policy.
    pub fn from_exponential(
        inner: ExponentialBackoffRetryPolicy<J>,
        max_backoff: Duration,
    ) -> Result<Self, ConfigError> {
        if max_backoff < inner.base_backoff() {
            return Err(ConfigError::MaxBackoffBelowBase {
                base: inner.base_backoff(),
                max_backoff,
            });
        }
        Ok(Self { inner, max_backoff })
    }

    /// Replace the jitter source.
    pub fn with_jitter<K: JitterSource>(self, jitter: K) -> BoundExponentialBackoffRetryPolicy<K> {
        BoundExponentialBackoffRetryPolicy {
            inner: self.inner.with_jitter(jitter),
            max_backoff: self.max_backoff,
        }
    }

    /// Get the wait cap.
    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// Get the base backoff time.
    pub fn base_backoff(&self) -> Duration {
        self.inner.base_backoff()
    }

    /// Get the maximum attempt index that is still retried.
    pub fn max_retries(&self) -> u32 {
        self.inner.max_retries()
    }

    /// The uncapped exponential policy this one clamps.
    pub fn exponential(&self) -> &ExponentialBackoffRetryPolicy<J> {
        &self.inner
    }

    pub(crate) fn into_exponential(self) -> ExponentialBackoffRetryPolicy<J> {
        self.inner
    }

    pub(crate) fn bounded_wait(&self, attempt: u32) -> Duration {
        self.inner.jittered_wait(attempt).min(self.max_backoff)
    }
}

impl<J: JitterSource> RetryPolicy for BoundExponentialBackoffRetryPolicy<J> {
    fn allow_retry(&self, attempt: u32, elapsed: Duration) -> bool {
        self.inner.allow_retry(attempt, elapsed)
    }

    fn next_retry_wait(&self, attempt: u32, _elapsed: Duration) -> Duration {
        let wait = self.bounded_wait(attempt);
        #[cfg(feature = "tracing")]
        tracing::trace!(attempt, ?wait, max_backoff = ?self.max_backoff, "bounded backoff");
        wait
    }
}
