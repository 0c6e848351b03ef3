//! The retry policy contract.

use std::sync::Arc;
use std::time::Duration;

/// Decides whether a failed operation may be retried, and how long to wait.
///
/// Policies are pure: both methods depend only on their arguments and the
/// policy's immutable configuration. They never sleep. The caller owns the
/// loop:
///
/// 1. attempt the operation
/// 2. on failure, ask [`allow_retry`](RetryPolicy::allow_retry)
/// 3. if permitted, wait [`next_retry_wait`](RetryPolicy::next_retry_wait)
/// 4. bump the attempt index, add the time spent, go to 1
///
/// `attempt` is the zero-based count of attempts already made and `elapsed`
/// is the time spent since the first attempt, as measured by the caller.
///
/// # Examples
///
/// ```rust
/// use backoff_policy::{ExponentialBackoffRetryPolicy, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = ExponentialBackoffRetryPolicy::new(Duration::from_millis(100), 5)?;
///
/// let mut attempt = 0;
/// let mut elapsed = Duration::ZERO;
/// while policy.allow_retry(attempt, elapsed) {
///     let wait = policy.next_retry_wait(attempt, elapsed);
///     assert!(wait >= Duration::from_millis(100));
///     elapsed += wait;
///     attempt += 1;
/// }
/// assert_eq!(attempt, 6);
/// # Ok::<(), backoff_policy::ConfigError>(())
/// ```
pub trait RetryPolicy: Send + Sync {
    /// Whether another attempt may be made.
    fn allow_retry(&self, attempt: u32, elapsed: Duration) -> bool;

    /// How long to wait before the next attempt.
    ///
    /// Only meaningful when [`allow_retry`](RetryPolicy::allow_retry) returned
    /// `true` for the same arguments. Otherwise the value is unspecified, but
    /// it never panics.
    fn next_retry_wait(&self, attempt: u32, elapsed: Duration) -> Duration;
}

impl<P: RetryPolicy + ?Sized> RetryPolicy for &P {
    fn allow_retry(&self, attempt: u32, elapsed: Duration) -> bool {
        (**self).allow_retry(attempt, elapsed)
    }

    fn next_retry_wait(&self, attempt: u32, elapsed: Duration) -> Duration {
        (**self).next_retry_wait(attempt, elapsed)
    }
}

impl<P: RetryPolicy + ?Sized> RetryPolicy for Box<P> {
    fn allow_retry(&self, attempt: u32, elapsed: Duration) -> bool {
        (**self).allow_retry(attempt, elapsed)
    }

    fn next_retry_wait(&self, attempt: u32, elapsed: Duration) -> Duration {
        (**self).next_retry_wait(attempt, elapsed)
    }
}

impl<P: RetryPolicy + ?Sized> RetryPolicy for Arc<P> {
    fn allow_retry(&self, attempt: u32, elapsed: Duration) -> bool {
        (**self).allow_retry(attempt, elapsed)
    }

    fn next_retry_wait(&self, attempt: u32, elapsed: Duration) -> Duration {
        (**self).next_retry_wait(attempt, elapsed)
    }
}

#[cfg(test)]
mod policy_tests {
    use super::*;

    #[derive(Debug)]
    struct FixedPolicy {
        max: u32,
        wait: Duration,
    }

    impl RetryPolicy for FixedPolicy {
        fn allow_retry(&self, attempt: u32, _elapsed: Duration) -> bool {
            attempt <= self.max
        }

        fn next_retry_wait(&self, _attempt: u32, _elapsed: Duration) -> Duration {
            self.wait
        }
    }

    fn fixed() -> FixedPolicy {
        FixedPolicy {
            max: 2,
            wait: Duration::from_millis(7),
        }
    }

    #[test]
    fn test_reference_delegates() {
        let policy = fixed();
        let by_ref: &dyn RetryPolicy = &policy;
        assert!(by_ref.allow_retry(2, Duration::ZERO));
        assert!(!by_ref.allow_retry(3, Duration::ZERO));
        assert_eq!(by_ref.next_retry_wait(0, Duration::ZERO), policy.wait);
    }

    #[test]
    fn test_box_delegates() {
        let boxed: Box<dyn RetryPolicy> = Box::new(fixed());
        assert!(boxed.allow_retry(0, Duration::ZERO));
        assert_eq!(
            boxed.next_retry_wait(1, Duration::ZERO),
            Duration::from_millis(7)
        );
    }

    #[test]
    fn test_arc_is_shareable_across_threads() {
        let shared: Arc<dyn RetryPolicy> = Arc::new(fixed());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || shared.allow_retry(i, Duration::ZERO))
            })
            .collect();

        let allowed: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(allowed, vec![true, true, true, false]);
    }
}
