//! # backoff-policy
//!
//! Retry timing policies for client and session layers.
//!
//! After an operation fails, a [`RetryPolicy`] decides whether another attempt
//! is allowed and how long to wait before making it. Policies never sleep or
//! schedule anything themselves. They are immutable values computing answers
//! from their inputs, so one instance can serve many callers at once.
//!
//! ## Quick Example
//!
//! ```rust
//! use backoff_policy::{BoundExponentialBackoffRetryPolicy, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = BoundExponentialBackoffRetryPolicy::new(
//!     Duration::from_millis(100), // base backoff
//!     Duration::from_secs(5),     // cap on any single wait
//!     10,                         // highest attempt index retried
//! )?;
//!
//! let mut attempt = 0;
//! let mut elapsed = Duration::ZERO;
//! while policy.allow_retry(attempt, elapsed) {
//!     let wait = policy.next_retry_wait(attempt, elapsed);
//!     assert!(wait >= Duration::from_millis(100) && wait <= Duration::from_secs(5));
//!     // the caller sleeps for `wait` and tries again
//!     elapsed += wait;
//!     attempt += 1;
//! }
//! # Ok::<(), backoff_policy::ConfigError>(())
//! ```
//!
//! ## Features
//!
//! - `async`: `retry::retry` and `retry::retry_if` drive an operation with tokio
//! - `tracing`: policies and the driver emit `tracing` events
//! - `serde`: (de)serialize [`config::PolicyConfig`]
//! - `proptest`: `Arbitrary` strategies for valid policy configurations

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod jitter;
pub mod retry;
pub mod testing;

// Re-exports
pub use config::PolicyConfig;
pub use jitter::{JitterSource, SeededJitter, ThreadJitter};
pub use retry::{
    BoundExponentialBackoffRetryPolicy, ConfigError, ExponentialBackOffWithDeadlinePolicy,
    ExponentialBackoffRetryPolicy, RetryDecision, RetryExhausted, RetryPolicy, RetryTracker,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::jitter::{JitterSource, SeededJitter, ThreadJitter};
    pub use crate::retry::{
        BoundExponentialBackoffRetryPolicy, ConfigError, ExponentialBackOffWithDeadlinePolicy,
        ExponentialBackoffRetryPolicy, RetryDecision, RetryPolicy, RetryTracker,
    };
}
