//! Retry timing policies.
//!
//! A policy answers two questions after a failure: may the caller try again,
//! and how long should it wait first. Policies are pure data plus arithmetic;
//! they never sleep, so they are easy to test and safe to share.
//!
//! # Quick Start
//!
//! ```rust
//! use backoff_policy::{ExponentialBackOffWithDeadlinePolicy, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = ExponentialBackOffWithDeadlinePolicy::new(
//!     Duration::from_millis(100),
//!     Duration::from_secs(1),
//!     5,
//! )?;
//!
//! let elapsed = Duration::from_millis(950);
//! if policy.allow_retry(4, elapsed) {
//!     // Never overshoots the deadline
//!     assert_eq!(policy.next_retry_wait(4, elapsed), Duration::from_millis(50));
//! }
//! # Ok::<(), backoff_policy::ConfigError>(())
//! ```
//!
//! # Policies
//!
//! - [`ExponentialBackoffRetryPolicy`]: jittered `base * 2^n`, attempt limit only
//! - [`BoundExponentialBackoffRetryPolicy`]: same, with each wait capped
//! - [`ExponentialBackOffWithDeadlinePolicy`]: same, plus a total time budget
//!
//! The bounded and deadline variants wrap the exponential one and clamp its
//! output; the backoff arithmetic lives in one place.
//!
//! # Driving retries
//!
//! - [`RetryTracker`]: counts attempts and elapsed time for one operation
//! - `retry` / `retry_if`: async loop that sleeps between attempts
//!   (requires the `async` feature)
//!
//! # Error Types
//!
//! - [`ConfigError`]: a policy was constructed from invalid settings
//! - [`RetryExhausted`]: the driver gave up, contains the final error and metadata

mod bounded;
mod deadline;
#[cfg(feature = "async")]
mod driver;
mod error;
mod exponential;
mod policy;
mod tracker;

pub use bounded::BoundExponentialBackoffRetryPolicy;
pub use deadline::ExponentialBackOffWithDeadlinePolicy;
#[cfg(feature = "async")]
pub use driver::{retry, retry_if};
pub use error::{ConfigError, RetryExhausted};
pub use exponential::ExponentialBackoffRetryPolicy;
pub use policy::RetryPolicy;
pub use tracker::{RetryDecision, RetryTracker};
