//! Declarative policy configuration.
//!
//! [`PolicyConfig`] describes one of the three policy variants with plain
//! millisecond fields, which is what session settings usually carry. With the
//! `serde` feature it can be embedded in any deserializable settings struct;
//! this crate itself never reads files or environment variables.
//!
//! # Example
//!
//! ```rust
//! use backoff_policy::config::PolicyConfig;
//! use std::time::Duration;
//!
//! let config = PolicyConfig::Deadline {
//!     base_backoff_ms: 100,
//!     deadline_ms: 1000,
//!     max_retries: 5,
//!     max_backoff_ms: None,
//! };
//!
//! let policy = config.build()?;
//! assert!(policy.allow_retry(2, Duration::from_millis(500)));
//! # Ok::<(), backoff_policy::ConfigError>(())
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::retry::{
    BoundExponentialBackoffRetryPolicy, ConfigError, ExponentialBackOffWithDeadlinePolicy,
    ExponentialBackoffRetryPolicy, RetryPolicy,
};

/// Settings for one retry policy variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum PolicyConfig {
    /// [`ExponentialBackoffRetryPolicy`] settings.
    Exponential {
        /// Base backoff in milliseconds.
        base_backoff_ms: u64,
        /// Highest attempt index still retried.
        max_retries: u32,
    },
    /// [`BoundExponentialBackoffRetryPolicy`] settings.
    Bounded {
        /// Base backoff in milliseconds.
        base_backoff_ms: u64,
        /// Wait cap in milliseconds.
        max_backoff_ms: u64,
        /// Highest attempt index still retried.
        max_retries: u32,
    },
    /// [`ExponentialBackOffWithDeadlinePolicy`] settings.
    Deadline {
        /// Base backoff in milliseconds.
        base_backoff_ms: u64,
        /// Total retry budget in milliseconds.
        deadline_ms: u64,
        /// Highest attempt index still retried.
        max_retries: u32,
        /// Optional per-wait cap in milliseconds.
        #[cfg_attr(feature = "serde", serde(default))]
        max_backoff_ms: Option<u64>,
    },
}

impl PolicyConfig {
    /// Validate the settings and build a shareable policy.
    ///
    /// Fails with the same [`ConfigError`] the policy constructors return.
    pub fn build(&self) -> Result<Arc<dyn RetryPolicy>, ConfigError> {
        let policy: Arc<dyn RetryPolicy> = match *self {
            PolicyConfig::Exponential {
                base_backoff_ms,
                max_retries,
            } => Arc::new(ExponentialBackoffRetryPolicy::new(
                Duration::from_millis(base_backoff_ms),
                max_retries,
            )?),
            PolicyConfig::Bounded {
                base_backoff_ms,
                max_backoff_ms,
                max_retries,
            } => Arc::new(BoundExponentialBackoffRetryPolicy::new(
                Duration::from_millis(base_backoff_ms),
                Duration::from_millis(max_backoff_ms),
                max_retries,
            )?),
            PolicyConfig::Deadline {
                base_backoff_ms,
                deadline_ms,
                max_retries,
                max_backoff_ms,
            } => {
                let policy = ExponentialBackOffWithDeadlinePolicy::new(
                    Duration::from_millis(base_backoff_ms),
                    Duration::from_millis(deadline_ms),
                    max_retries,
                )?;
                match max_backoff_ms {
                    Some(ms) => Arc::new(policy.with_max_backoff(Duration::from_millis(ms))?),
                    None => Arc::new(policy),
                }
            }
        };
        Ok(policy)
    }
}
