//! Testing utilities for code that consumes retry policies.
//!
//! Jittered waits are random by design, which makes exact assertions awkward.
//! This module provides a deterministic jitter source, a range assertion
//! macro, and (with the `proptest` feature) strategies for valid policy
//! configurations.
//!
//! # Examples
//!
//! ## Pinning jitter to its extremes
//!
//! ```rust
//! use backoff_policy::testing::ScriptedJitter;
//! use backoff_policy::{ExponentialBackoffRetryPolicy, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = ExponentialBackoffRetryPolicy::new(Duration::from_millis(100), 5)?
//!     .with_jitter(ScriptedJitter::high());
//!
//! // Largest multiple below 2^(2+1)
//! assert_eq!(policy.next_retry_wait(2, Duration::ZERO), Duration::from_millis(700));
//! # Ok::<(), backoff_policy::ConfigError>(())
//! ```
//!
//! ## Range assertions
//!
//! ```rust
//! use backoff_policy::assert_wait_within;
//! use std::time::Duration;
//!
//! assert_wait_within!(
//!     Duration::from_millis(250),
//!     Duration::from_millis(100),
//!     Duration::from_millis(400)
//! );
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::jitter::JitterSource;

/// One scripted draw, relative to the requested bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draw {
    /// Always `0`.
    Low,
    /// Always `bound - 1`.
    High,
    /// A fixed value, clamped to `bound - 1`.
    Value(u64),
}

impl Draw {
    fn resolve(self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        match self {
            Draw::Low => 0,
            Draw::High => bound - 1,
            Draw::Value(v) => v.min(bound - 1),
        }
    }
}

/// A [`JitterSource`] replaying a fixed script of draws, cycling forever.
///
/// # Example
///
/// ```rust
/// use backoff_policy::jitter::JitterSource;
/// use backoff_policy::testing::{Draw, ScriptedJitter};
///
/// let jitter = ScriptedJitter::new(vec![Draw::Low, Draw::High, Draw::Value(3)]);
///
/// assert_eq!(jitter.below(10), 0);
/// assert_eq!(jitter.below(10), 9);
/// assert_eq!(jitter.below(2), 1);
/// assert_eq!(jitter.below(10), 0);
/// ```
#[derive(Debug)]
pub struct ScriptedJitter {
    draws: Vec<Draw>,
    cursor: AtomicUsize,
}

impl ScriptedJitter {
    /// Replay `draws` in order. An empty script always draws low.
    pub fn new(draws: Vec<Draw>) -> Self {
        Self {
            draws,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Always draw the smallest value.
    pub fn low() -> Self {
        Self::new(vec![Draw::Low])
    }

    /// Always draw the largest value below the bound.
    pub fn high() -> Self {
        Self::new(vec![Draw::High])
    }
}

impl Clone for ScriptedJitter {
    fn clone(&self) -> Self {
        Self {
            draws: self.draws.clone(),
            cursor: AtomicUsize::new(self.cursor.load(Ordering::Relaxed)),
        }
    }
}

impl JitterSource for ScriptedJitter {
    fn below(&self, bound: u64) -> u64 {
        if self.draws.is_empty() {
            return 0;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.draws.len();
        self.draws[index].resolve(bound)
    }
}

/// Assert that a wait lies in the half-open range `[lo, hi)`.
///
/// # Example
///
/// ```rust
/// use backoff_policy::assert_wait_within;
/// use std::time::Duration;
///
/// assert_wait_within!(Duration::from_millis(100), Duration::from_millis(100), Duration::from_millis(200));
/// ```
#[macro_export]
macro_rules! assert_wait_within {
    ($wait:expr, $lo:expr, $hi:expr) => {{
        let wait: ::std::time::Duration = $wait;
        let lo: ::std::time::Duration = $lo;
        let hi: ::std::time::Duration = $hi;
        if wait < lo || wait >= hi {
            panic!("Expected wait in [{:?}, {:?}), got {:?}", lo, hi, wait);
        }
    }};
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for crate::config::PolicyConfig {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    /// Only valid configurations: positive base, caps and deadlines at or
    /// above the base.
    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        use crate::config::PolicyConfig;

        let base = 1u64..10_000;
        let retries = 0u32..64;
        prop_oneof![
            (base.clone(), retries.clone()).prop_map(|(base_backoff_ms, max_retries)| {
                PolicyConfig::Exponential {
                    base_backoff_ms,
                    max_retries,
                }
            }),
            (base.clone(), 0u64..100_000, retries.clone()).prop_map(
                |(base_backoff_ms, extra, max_retries)| PolicyConfig::Bounded {
                    base_backoff_ms,
                    max_backoff_ms: base_backoff_ms + extra,
                    max_retries,
                }
            ),
            (base, 0u64..1_000_000, retries, any::<bool>()).prop_map(
                |(base_backoff_ms, extra, max_retries, capped)| PolicyConfig::Deadline {
                    base_backoff_ms,
                    deadline_ms: base_backoff_ms + extra,
                    max_retries,
                    max_backoff_ms: capped.then_some(base_backoff_ms + extra / 2),
                }
            ),
        ]
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn scripted_low_and_high() {
        assert_eq!(ScriptedJitter::low().below(100), 0);
        assert_eq!(ScriptedJitter::high().below(100), 99);
        assert_eq!(ScriptedJitter::high().below(0), 0);
    }

    #[test]
    fn scripted_cycles() {
        let jitter = ScriptedJitter::new(vec![Draw::Value(5), Draw::High]);
        assert_eq!(jitter.below(10), 5);
        assert_eq!(jitter.below(10), 9);
        assert_eq!(jitter.below(3), 2);
    }

    #[test]
    fn scripted_empty_draws_low() {
        let jitter = ScriptedJitter::new(Vec::new());
        assert_eq!(jitter.below(10), 0);
    }

    #[test]
    fn scripted_clone_keeps_position() {
        let jitter = ScriptedJitter::new(vec![Draw::Low, Draw::High]);
        assert_eq!(jitter.below(4), 0);
        let cloned = jitter.clone();
        assert_eq!(cloned.below(4), 3);
        assert_eq!(jitter.below(4), 3);
    }

    #[test]
    fn wait_within_macro() {
        assert_wait_within!(
            Duration::from_millis(150),
            Duration::from_millis(100),
            Duration::from_millis(200)
        );
    }

    #[test]
    #[should_panic(expected = "Expected wait in")]
    fn wait_within_macro_rejects_upper_bound() {
        assert_wait_within!(
            Duration::from_millis(200),
            Duration::from_millis(100),
            Duration::from_millis(200)
        );
    }

    #[cfg(feature = "proptest")]
    mod proptest_tests {
        use crate::config::PolicyConfig;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn arbitrary_configs_always_build(config in any::<PolicyConfig>()) {
                prop_assert!(config.build().is_ok());
            }
        }
    }
}
