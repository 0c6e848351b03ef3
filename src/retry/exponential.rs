//! Unbounded exponential backoff with multiplicative jitter.
//!
//! The wait before retry `n` is `base * m`, where the multiplier `m` is drawn
//! uniformly from `[0, 2^(n+1))` and floored at 1. Waits therefore fall in
//! `[base, base * 2^(n+1))`: never below the base, never at or above twice
//! the deterministic backoff `base * 2^n`.
//!
//! All arithmetic saturates. Large attempt indices pin the multiplier range at
//! `u64::MAX`, and a product that no longer fits becomes [`Duration::MAX`]
//! instead of wrapping.

use std::time::Duration;

use super::error::ConfigError;
use super::policy::RetryPolicy;
use crate::jitter::{JitterSource, ThreadJitter};

/// Exponential backoff capped only by attempt count.
///
/// # Examples
///
/// ```rust
/// use backoff_policy::{ExponentialBackoffRetryPolicy, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = ExponentialBackoffRetryPolicy::new(Duration::from_millis(100), 5)?;
///
/// assert!(policy.allow_retry(5, Duration::ZERO));
/// assert!(!policy.allow_retry(6, Duration::ZERO));
///
/// let wait = policy.next_retry_wait(3, Duration::ZERO);
/// assert!(wait >= Duration::from_millis(100));
/// assert!(wait < Duration::from_millis(1600));
/// # Ok::<(), backoff_policy::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialBackoffRetryPolicy<J = ThreadJitter> {
    base_backoff: Duration,
    max_retries: u32,
    jitter: J,
}

impl ExponentialBackoffRetryPolicy {
    /// Create a policy drawing jitter from the thread-local generator.
    ///
    /// Fails with [`ConfigError::ZeroBaseBackoff`] if `base_backoff` is zero.
    pub fn new(base_backoff: Duration, max_retries: u32) -> Result<Self, ConfigError> {
        if base_backoff.is_zero() {
            return Err(ConfigError::ZeroBaseBackoff);
        }
        Ok(Self {
            base_backoff,
            max_retries,
            jitter: ThreadJitter,
        })
    }
}

impl<J: JitterSource> ExponentialBackoffRetryPolicy<J> {
    /// Replace the jitter source.
    ///
    /// ```rust
    /// use backoff_policy::jitter::SeededJitter;
    /// use backoff_policy::{ExponentialBackoffRetryPolicy, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// let a = ExponentialBackoffRetryPolicy::new(Duration::from_millis(10), 3)?
    ///     .with_jitter(SeededJitter::new(1));
    /// let b = ExponentialBackoffRetryPolicy::new(Duration::from_millis(10), 3)?
    ///     .with_jitter(SeededJitter::new(1));
    ///
    /// assert_eq!(
    ///     a.next_retry_wait(3, Duration::ZERO),
    ///     b.next_retry_wait(3, Duration::ZERO)
    /// );
    /// # Ok::<(), backoff_policy::ConfigError>(())
    /// ```
    pub fn with_jitter<K: JitterSource>(self, jitter: K) -> ExponentialBackoffRetryPolicy<K> {
        ExponentialBackoffRetryPolicy {
            base_backoff: self.base_backoff,
            max_retries: self.max_retries,
            jitter,
        }
    }

    /// Get the base backoff time.
    pub fn base_backoff(&self) -> Duration {
        self.base_backoff
    }

    /// Get the maximum attempt index that is still retried.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Get the jitter source.
    pub fn jitter(&self) -> &J {
        &self.jitter
    }

    /// The un-jittered backoff `base * 2^attempt`, saturating at [`Duration::MAX`].
    ///
    /// ```rust
    /// use backoff_policy::ExponentialBackoffRetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = ExponentialBackoffRetryPolicy::new(Duration::from_millis(100), 5)?;
    /// assert_eq!(policy.deterministic_backoff(0), Duration::from_millis(100));
    /// assert_eq!(policy.deterministic_backoff(3), Duration::from_millis(800));
    /// assert_eq!(policy.deterministic_backoff(200), Duration::MAX);
    /// # Ok::<(), backoff_policy::ConfigError>(())
    /// ```
    pub fn deterministic_backoff(&self, attempt: u32) -> Duration {
        match 1u64.checked_shl(attempt) {
            Some(factor) => scale(self.base_backoff, factor),
            None => Duration::MAX,
        }
    }

    pub(crate) fn jittered_wait(&self, attempt: u32) -> Duration {
        jittered_backoff(self.base_backoff, attempt, &self.jitter)
    }
}

impl<J: JitterSource> RetryPolicy for ExponentialBackoffRetryPolicy<J> {
    fn allow_retry(&self, attempt: u32, _elapsed: Duration) -> bool {
        let allowed = attempt <= self.max_retries;
        #[cfg(feature = "tracing")]
        if !allowed {
            tracing::debug!(
                attempt,
                max_retries = self.max_retries,
                "retry refused: attempt limit reached"
            );
        }
        allowed
    }

    fn next_retry_wait(&self, attempt: u32, _elapsed: Duration) -> Duration {
        let wait = self.jittered_wait(attempt);
        #[cfg(feature = "tracing")]
        tracing::trace!(attempt, ?wait, "exponential backoff");
        wait
    }
}

/// Raw jittered exponential wait shared by every policy variant.
///
/// Returns `base * max(1, m)` with `m` uniform in `[0, 2^(attempt+1))`.
pub(crate) fn jittered_backoff<J: JitterSource + ?Sized>(
    base: Duration,
    attempt: u32,
    jitter: &J,
) -> Duration {
    let span = attempt
        .checked_add(1)
        .and_then(|shift| 1u64.checked_shl(shift))
        .unwrap_or(u64::MAX);
    let multiplier = jitter.below(span).max(1);
    scale(base, multiplier)
}

fn scale(base: Duration, factor: u64) -> Duration {
    base.as_nanos()
        .checked_mul(u128::from(factor))
        .map_or(Duration::MAX, duration_from_nanos)
}

fn duration_from_nanos(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    match u64::try_from(nanos / NANOS_PER_SEC) {
        // Remainder is below one second, so it always fits in u32.
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}
