//! Error types for retry policies.

use std::time::Duration;

/// Error returned when a policy is constructed from invalid settings.
///
/// A policy can never exist in an invalid state: every constructor validates
/// its inputs and returns this error instead.
///
/// # Examples
///
/// ```rust
/// use backoff_policy::{BoundExponentialBackoffRetryPolicy, ConfigError};
/// use std::time::Duration;
///
/// let err = BoundExponentialBackoffRetryPolicy::new(
///     Duration::from_millis(500),
///     Duration::from_millis(100),
///     3,
/// )
/// .unwrap_err();
///
/// assert!(matches!(err, ConfigError::MaxBackoffBelowBase { .. }));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The base backoff time was zero.
    ZeroBaseBackoff,
    /// The wait cap is smaller than the base backoff time.
    MaxBackoffBelowBase {
        /// Configured base backoff.
        base: Duration,
        /// Configured cap.
        max_backoff: Duration,
    },
    /// The deadline is smaller than the base backoff time.
    DeadlineBelowBase {
        /// Configured base backoff.
        base: Duration,
        /// Configured deadline.
        deadline: Duration,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroBaseBackoff => write!(f, "base backoff time must be greater than zero"),
            Self::MaxBackoffBelowBase { base, max_backoff } => write!(
                f,
                "max backoff time {:?} is below base backoff time {:?}",
                max_backoff, base
            ),
            Self::DeadlineBelowBase { base, deadline } => write!(
                f,
                "deadline {:?} is below base backoff time {:?}",
                deadline, base
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error returned when a retried operation never succeeded.
///
/// Contains the final error along with metadata about the retry sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// The error from the final attempt.
    pub final_error: E,
    /// Total number of attempts made (initial + retries).
    pub attempts: u32,
    /// Total time spent, including waits.
    pub total_duration: Duration,
}

impl<E> RetryExhausted<E> {
    /// Create a new RetryExhausted error.
    pub fn new(final_error: E, attempts: u32, total_duration: Duration) -> Self {
        Self {
            final_error,
            attempts,
            total_duration,
        }
    }

    /// Extract the final error, discarding metadata.
    pub fn into_error(self) -> E {
        self.final_error
    }

    /// Get a reference to the final error.
    pub fn error(&self) -> &E {
        &self.final_error
    }
}

impl<E: std::fmt::Display> std::fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "retry exhausted after {} attempts ({:?}): {}",
            self.attempts, self.total_duration, self.final_error
        )
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryExhausted<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.final_error)
    }
}
