//! Caller-side bookkeeping for a single retried operation.
//!
//! A policy is stateless; somebody still has to count attempts and measure
//! elapsed time. [`RetryTracker`] does that for one operation so a session
//! worker only has to report failures and act on the [`RetryDecision`].

use std::time::{Duration, Instant};

use super::policy::RetryPolicy;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait this long, then try again.
    Retry(Duration),
    /// Stop retrying.
    GiveUp {
        /// Attempts made, including the one that just failed.
        attempts: u32,
        /// Time since the first attempt started.
        elapsed: Duration,
    },
}

impl RetryDecision {
    /// The wait, if this decision is to retry.
    pub fn wait(&self) -> Option<Duration> {
        match self {
            RetryDecision::Retry(wait) => Some(*wait),
            RetryDecision::GiveUp { .. } => None,
        }
    }

    /// Returns true if the caller should retry.
    pub fn is_retry(&self) -> bool {
        matches!(self, RetryDecision::Retry(_))
    }
}

/// Tracks attempt index and elapsed time for one operation.
///
/// # Example
///
/// ```rust
/// use backoff_policy::{BoundExponentialBackoffRetryPolicy, RetryDecision, RetryTracker};
/// use std::time::{Duration, Instant};
///
/// let policy = BoundExponentialBackoffRetryPolicy::new(
///     Duration::from_millis(10),
///     Duration::from_millis(40),
///     1,
/// )?;
/// let start = Instant::now();
/// let mut tracker = RetryTracker::starting_at(&policy, start);
///
/// assert!(tracker.on_failure_at(start).is_retry());
/// assert!(tracker.on_failure_at(start).is_retry());
/// assert_eq!(
///     tracker.on_failure_at(start),
///     RetryDecision::GiveUp { attempts: 3, elapsed: Duration::ZERO }
/// );
/// # Ok::<(), backoff_policy::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RetryTracker<P> {
    policy: P,
    started: Instant,
    attempt: u32,
}

impl<P: RetryPolicy> RetryTracker<P> {
    /// Start tracking now.
    pub fn new(policy: P) -> Self {
        Self::starting_at(policy, Instant::now())
    }

    /// Start tracking from a given instant.
    pub fn starting_at(policy: P, started: Instant) -> Self {
        Self {
            policy,
            started,
            attempt: 0,
        }
    }

    /// Zero-based index of the next failure to be reported.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Time since tracking started, as seen at `now`.
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    /// Get the policy being consulted.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Report a failure observed now.
    pub fn on_failure(&mut self) -> RetryDecision {
        self.on_failure_at(Instant::now())
    }

    /// Report a failure observed at `now`.
    ///
    /// On [`RetryDecision::Retry`] the attempt index advances; on give-up it
    /// stays put, so repeated calls keep giving up.
    pub fn on_failure_at(&mut self, now: Instant) -> RetryDecision {
        self.on_failure_after(self.elapsed_at(now))
    }

    /// Report a failure `elapsed` after the first attempt started.
    ///
    /// For callers that keep their own clock, such as an async runtime's
    /// timer; the tracker's start instant is ignored.
    pub fn on_failure_after(&mut self, elapsed: Duration) -> RetryDecision {
        if !self.policy.allow_retry(self.attempt, elapsed) {
            return RetryDecision::GiveUp {
                attempts: self.attempt.saturating_add(1),
                elapsed,
            };
        }
        let wait = self.policy.next_retry_wait(self.attempt, elapsed);
        self.attempt = self.attempt.saturating_add(1);
        RetryDecision::Retry(wait)
    }

    /// Forget previous failures and restart the clock at `now`.
    pub fn reset_at(&mut self, now: Instant) {
        self.started = now;
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tracker_tests {
    use super::*;
    use crate::retry::{ExponentialBackOffWithDeadlinePolicy, ExponentialBackoffRetryPolicy};
    use crate::testing::ScriptedJitter;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_gives_up_after_max_retries_plus_one_failures() {
        let policy = ExponentialBackoffRetryPolicy::new(ms(1), 3).unwrap();
        let start = Instant::now();
        let mut tracker = RetryTracker::starting_at(policy, start);

        for expected in 0..=3 {
            assert_eq!(tracker.attempt(), expected);
            assert!(tracker.on_failure_at(start).is_retry());
        }
        let decision = tracker.on_failure_at(start);
        assert_eq!(
            decision,
            RetryDecision::GiveUp {
                attempts: 5,
                elapsed: Duration::ZERO
            }
        );
        assert_eq!(decision.wait(), None);
        // Giving up does not advance the index.
        assert_eq!(tracker.attempt(), 4);
    }

    #[test]
    fn test_waits_follow_policy() {
        let policy = ExponentialBackoffRetryPolicy::new(ms(10), 5)
            .unwrap()
            .with_jitter(ScriptedJitter::high());
        let start = Instant::now();
        let mut tracker = RetryTracker::starting_at(policy, start);

        let waits: Vec<_> = (0..3)
            .map(|_| tracker.on_failure_at(start).wait().unwrap())
            .collect();
        assert_eq!(waits, vec![ms(10), ms(30), ms(70)]);
    }

    #[test]
    fn test_deadline_measured_from_start() {
        let policy = ExponentialBackOffWithDeadlinePolicy::new(ms(100), ms(1000), 5).unwrap();
        let start = Instant::now();
        let mut tracker = RetryTracker::starting_at(&policy, start);

        assert_eq!(
            tracker.on_failure_at(start + ms(950)),
            RetryDecision::Retry(ms(50))
        );
        assert_eq!(
            tracker.on_failure_at(start + ms(1000)),
            RetryDecision::GiveUp {
                attempts: 2,
                elapsed: ms(1000)
            }
        );
    }

    #[test]
    fn test_clock_before_start_counts_as_zero() {
        let policy = ExponentialBackoffRetryPolicy::new(ms(1), 0).unwrap();
        let start = Instant::now() + ms(500);
        let tracker = RetryTracker::starting_at(policy, start);
        assert_eq!(tracker.elapsed_at(start - ms(100)), Duration::ZERO);
    }

    #[test]
    fn test_reset() {
        let policy = ExponentialBackoffRetryPolicy::new(ms(1), 0).unwrap();
        let start = Instant::now();
        let mut tracker = RetryTracker::starting_at(policy, start);

        assert!(tracker.on_failure_at(start).is_retry());
        assert!(!tracker.on_failure_at(start).is_retry());

        tracker.reset_at(start + ms(5));
        assert_eq!(tracker.attempt(), 0);
        assert!(tracker.on_failure_at(start + ms(5)).is_retry());
        assert_eq!(tracker.policy().max_retries(), 0);
    }

    #[test]
    fn test_on_failure_after_uses_supplied_elapsed() {
        let policy = ExponentialBackOffWithDeadlinePolicy::new(ms(10), ms(60), 1_000).unwrap();
        let mut tracker = RetryTracker::new(&policy);

        assert_eq!(tracker.on_failure_after(ms(55)), RetryDecision::Retry(ms(5)));
        assert_eq!(
            tracker.on_failure_after(ms(60)),
            RetryDecision::GiveUp {
                attempts: 2,
                elapsed: ms(60)
            }
        );
    }

    #[test]
    fn test_on_failure_uses_wall_clock() {
        let policy = ExponentialBackoffRetryPolicy::new(ms(1), 1).unwrap();
        let mut tracker = RetryTracker::new(policy);
        assert!(tracker.on_failure().is_retry());
    }
}
