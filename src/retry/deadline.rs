//! Exponential backoff bounded by a total time budget.
//!
//! Retries stop once either the attempt limit or the deadline is exhausted,
//! whichever comes first. Each wait is clamped to the remaining budget so a
//! caller that sleeps for it never overshoots the deadline. Near the deadline
//! the remaining budget wins over the base floor: with 50ms left the wait is
//! exactly 50ms even when the base backoff is larger.

use std::time::Duration;

use super::bounded::BoundExponentialBackoffRetryPolicy;
use super::error::ConfigError;
use super::exponential::ExponentialBackoffRetryPolicy;
use super::policy::RetryPolicy;
use crate::jitter::{JitterSource, ThreadJitter};

/// Exponential backoff that respects an absolute elapsed-time deadline.
///
/// # Examples
///
/// ```rust
/// use backoff_policy::{ExponentialBackOffWithDeadlinePolicy, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = ExponentialBackOffWithDeadlinePolicy::new(
///     Duration::from_millis(100),
///     Duration::from_millis(1000),
///     5,
/// )?;
///
/// assert!(policy.allow_retry(2, Duration::from_millis(500)));
/// assert!(!policy.allow_retry(2, Duration::from_millis(1200)));
/// assert_eq!(
///     policy.next_retry_wait(4, Duration::from_millis(950)),
///     Duration::from_millis(50)
/// );
/// # Ok::<(), backoff_policy::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialBackOffWithDeadlinePolicy<J = ThreadJitter> {
    bounded: BoundExponentialBackoffRetryPolicy<J>,
    deadline: Duration,
}

impl ExponentialBackOffWithDeadlinePolicy {
    /// Create a deadline-aware policy.
    ///
    /// Individual waits are capped at `deadline` until
    /// [`with_max_backoff`](Self::with_max_backoff) sets a tighter bound.
    /// Fails if `base_backoff` is zero or `deadline < base_backoff`.
    pub fn new(
        base_backoff: Duration,
        deadline: Duration,
        max_retries: u32,
    ) -> Result<Self, ConfigError> {
        let inner = ExponentialBackoffRetryPolicy::new(base_backoff, max_retries)?;
        if deadline < base_backoff {
            return Err(ConfigError::DeadlineBelowBase {
                base: base_backoff,
                deadline,
            });
        }
        Ok(Self {
            bounded: BoundExponentialBackoffRetryPolicy::from_exponential(inner, deadline)?,
            deadline,
        })
    }
}

impl<J: JitterSource> ExponentialBackOffWithDeadlinePolicy<J> {
    /// Cap individual waits before the deadline clamp is applied.
    ///
    /// ```rust
    /// use backoff_policy::{ExponentialBackOffWithDeadlinePolicy, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// let policy = ExponentialBackOffWithDeadlinePolicy::new(
    ///     Duration::from_millis(10),
    ///     Duration::from_secs(60),
    ///     20,
    /// )?
    /// .with_max_backoff(Duration::from_secs(1))?;
    ///
    /// assert!(policy.next_retry_wait(15, Duration::ZERO) <= Duration::from_secs(1));
    /// # Ok::<(), backoff_policy::ConfigError>(())
    /// ```
    pub fn with_max_backoff(self, max_backoff: Duration) -> Result<Self, ConfigError> {
        let inner = self.bounded.into_exponential();
        let bounded = BoundExponentialBackoffRetryPolicy::from_exponential(inner, max_backoff)?;
        Ok(Self {
            bounded,
            deadline: self.deadline,
        })
    }

    /// Replace the jitter source.
    pub fn with_jitter<K: JitterSource>(self, jitter: K) -> ExponentialBackOffWithDeadlinePolicy<K> {
        ExponentialBackOffWithDeadlinePolicy {
            bounded: self.bounded.with_jitter(jitter),
            deadline: self.deadline,
        }
    }

    /// Get the total time budget.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Get the per-wait cap applied before the deadline clamp.
    pub fn max_backoff(&self) -> Duration {
        self.bounded.max_backoff()
    }

    /// Get the base backoff time.
    pub fn base_backoff(&self) -> Duration {
        self.bounded.base_backoff()
    }

    /// Get the maximum attempt index that is still retried.
    pub fn max_retries(&self) -> u32 {
        self.bounded.max_retries()
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.deadline.saturating_sub(elapsed)
    }
}

impl<J: JitterSource> RetryPolicy for ExponentialBackOffWithDeadlinePolicy<J> {
    fn allow_retry(&self, attempt: u32, elapsed: Duration) -> bool {
        if !self.bounded.allow_retry(attempt, elapsed) {
            return false;
        }
        let within = elapsed < self.deadline;
        #[cfg(feature = "tracing")]
        if !within {
            tracing::debug!(
                attempt,
                ?elapsed,
                deadline = ?self.deadline,
                "retry refused: deadline passed"
            );
        }
        within
    }

    fn next_retry_wait(&self, attempt: u32, elapsed: Duration) -> Duration {
        let remaining = self.remaining(elapsed);
        let wait = self.bounded.bounded_wait(attempt).min(remaining);
        #[cfg(feature = "tracing")]
        tracing::trace!(attempt, ?wait, ?remaining, "deadline backoff");
        wait
    }
}
