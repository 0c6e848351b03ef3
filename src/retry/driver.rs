//! Async retry loop driven by a [`RetryPolicy`].
//!
//! The policies only advise; this module is the imperative shell that actually
//! sleeps between attempts using `tokio::time::sleep`. Elapsed time is read
//! from tokio's clock as well, so deadlines hold under a paused test runtime.

use std::future::Future;

use tokio::time::Instant;

use super::error::RetryExhausted;
use super::policy::RetryPolicy;
use super::tracker::{RetryDecision, RetryTracker};

/// Run `operation` until it succeeds or the policy refuses another attempt.
///
/// Each attempt calls the factory afresh, so every retry gets a new future.
///
/// # Example
///
/// ```rust
/// use backoff_policy::retry::retry;
/// use backoff_policy::ExponentialBackoffRetryPolicy;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let policy = ExponentialBackoffRetryPolicy::new(Duration::from_millis(1), 3).unwrap();
///
/// let mut calls = 0;
/// let result = retry(&policy, || {
///     calls += 1;
///     let n = calls;
///     async move { if n < 3 { Err("connection loss") } else { Ok(n) } }
/// })
/// .await;
///
/// assert_eq!(result, Ok(3));
/// # });
/// ```
pub async fn retry<P, F, Fut, T, E>(policy: P, operation: F) -> Result<T, RetryExhausted<E>>
where
    P: RetryPolicy,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_if(policy, operation, |_| true).await
}

/// Like [`retry`], but only errors matching `should_retry` are retried.
///
/// A non-matching error ends the loop immediately; it is still wrapped in
/// [`RetryExhausted`] so callers see how many attempts were made.
pub async fn retry_if<P, F, Fut, T, E, R>(
    policy: P,
    mut operation: F,
    should_retry: R,
) -> Result<T, RetryExhausted<E>>
where
    P: RetryPolicy,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let start = Instant::now();
    let mut tracker = RetryTracker::new(policy);

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if !should_retry(&error) {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempt = tracker.attempt(), "error is not retryable");
            return Err(RetryExhausted::new(
                error,
                tracker.attempt().saturating_add(1),
                start.elapsed(),
            ));
        }

        match tracker.on_failure_after(start.elapsed()) {
            RetryDecision::Retry(wait) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt = tracker.attempt(), ?wait, "retrying after backoff");
                tokio::time::sleep(wait).await;
            }
            RetryDecision::GiveUp { attempts, elapsed } => {
                #[cfg(feature = "tracing")]
                tracing::warn!(attempts, ?elapsed, "giving up after repeated failures");
                return Err(RetryExhausted::new(error, attempts, elapsed));
            }
        }
    }
}
