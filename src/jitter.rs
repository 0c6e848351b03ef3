//! Randomness sources for backoff jitter.
//!
//! Jitter desynchronizes clients that fail at the same moment, so they do not
//! all come back at once. Policies never reach for global randomness directly;
//! they draw from a [`JitterSource`], which keeps the randomness swappable:
//!
//! - [`ThreadJitter`]: the default, backed by the thread-local `rand` generator
//! - [`SeededJitter`]: a reproducible stream for tests and simulations
//!
//! # Example
//!
//! ```rust
//! use backoff_policy::jitter::{JitterSource, SeededJitter};
//!
//! let a = SeededJitter::new(7);
//! let b = SeededJitter::new(7);
//!
//! // Same seed, same stream
//! assert_eq!(a.below(1_000), b.below(1_000));
//! ```

use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform random integers used to jitter wait times.
///
/// Implementations must be safe to share between threads: one policy
/// instance may be consulted by many callers at once.
pub trait JitterSource: Send + Sync + Debug {
    /// Draw a uniform value in `[0, bound)`.
    ///
    /// Returns `0` when `bound` is `0`.
    fn below(&self, bound: u64) -> u64;
}

/// Jitter drawn from the calling thread's `rand` generator.
///
/// Holds no state of its own, so every thread draws independently without
/// locking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadJitter;

impl JitterSource for ThreadJitter {
    fn below(&self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        rand::rng().random_range(0..bound)
    }
}

/// Reproducible jitter from a seeded `StdRng`.
///
/// Clones share one underlying stream. The generator sits behind a mutex so
/// concurrent callers each take the next value in turn.
#[derive(Debug, Clone)]
pub struct SeededJitter {
    rng: Arc<Mutex<StdRng>>,
}

impl SeededJitter {
    /// Create a jitter stream from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }
}

impl JitterSource for SeededJitter {
    fn below(&self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        // A panic elsewhere cannot leave an RNG in a broken state, so keep going.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random_range(0..bound)
    }
}

impl<J: JitterSource + ?Sized> JitterSource for &J {
    fn below(&self, bound: u64) -> u64 {
        (**self).below(bound)
    }
}

impl<J: JitterSource + ?Sized> JitterSource for Arc<J> {
    fn below(&self, bound: u64) -> u64 {
        (**self).below(bound)
    }
}

#[cfg(test)]
mod jitter_tests {
    use super::*;

    #[test]
    fn test_thread_jitter_stays_below_bound() {
        for bound in [1u64, 2, 3, 10, 1_000, u64::MAX] {
            for _ in 0..100 {
                assert!(ThreadJitter.below(bound) < bound);
            }
        }
    }

    #[test]
    fn test_zero_bound_yields_zero() {
        assert_eq!(ThreadJitter.below(0), 0);
        assert_eq!(SeededJitter::new(1).below(0), 0);
    }

    #[test]
    fn test_bound_of_one_is_always_zero() {
        let seeded = SeededJitter::new(99);
        for _ in 0..50 {
            assert_eq!(seeded.below(1), 0);
            assert_eq!(ThreadJitter.below(1), 0);
        }
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let a = SeededJitter::new(42);
        let b = SeededJitter::new(42);

        let left: Vec<u64> = (0..32).map(|_| a.below(10_000)).collect();
        let right: Vec<u64> = (0..32).map(|_| b.below(10_000)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_seeded_clones_share_stream() {
        let a = SeededJitter::new(5);
        let b = a.clone();
        let fresh = SeededJitter::new(5);

        let first = a.below(1 << 40);
        let second = b.below(1 << 40);

        assert_eq!(first, fresh.below(1 << 40));
        assert_eq!(second, fresh.below(1 << 40));
    }

    #[test]
    fn test_arc_dyn_source() {
        let source: Arc<dyn JitterSource> = Arc::new(SeededJitter::new(3));
        assert!(source.below(8) < 8);
    }

    #[test]
    fn test_seeded_jitter_across_threads() {
        let jitter = SeededJitter::new(11);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let jitter = jitter.clone();
                std::thread::spawn(move || (0..100).all(|_| jitter.below(64) < 64))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
