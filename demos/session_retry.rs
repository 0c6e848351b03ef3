//! Session Retry Example
//!
//! Demonstrates how a session layer consumes the retry policies:
//! - Walking a policy by hand (attempt index + elapsed time)
//! - Using RetryTracker for bookkeeping
//! - Driving a flaky async operation with retry_if
//!
//! Run with: cargo run --example session_retry --features async

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use backoff_policy::retry::retry_if;
use backoff_policy::{
    BoundExponentialBackoffRetryPolicy, ConfigError, ExponentialBackOffWithDeadlinePolicy,
    RetryDecision, RetryPolicy, RetryTracker,
};

#[derive(Debug, Clone, PartialEq)]
enum SessionError {
    ConnectionLoss,
    SessionExpired,
}

/// Example 1: the raw loop a caller writes against the two-method contract.
fn example_manual_loop() -> Result<(), ConfigError> {
    println!("\n=== Example 1: Manual Loop ===");

    let policy = ExponentialBackOffWithDeadlinePolicy::new(
        Duration::from_millis(100),
        Duration::from_secs(2),
        8,
    )?;

    let mut attempt = 0;
    let mut elapsed = Duration::ZERO;
    while policy.allow_retry(attempt, elapsed) {
        let wait = policy.next_retry_wait(attempt, elapsed);
        println!("  attempt {} failed at {:?}, waiting {:?}", attempt, elapsed, wait);
        elapsed += wait;
        attempt += 1;
    }
    println!("  gave up after {} attempts, {:?} spent", attempt, elapsed);
    Ok(())
}

/// Example 2: let RetryTracker count attempts and measure time.
async fn example_tracker() -> Result<(), ConfigError> {
    println!("\n=== Example 2: RetryTracker ===");

    let policy = BoundExponentialBackoffRetryPolicy::new(
        Duration::from_millis(5),
        Duration::from_millis(20),
        3,
    )?;
    let mut tracker = RetryTracker::new(&policy);

    loop {
        match tracker.on_failure() {
            RetryDecision::Retry(wait) => {
                println!("  retry #{} in {:?}", tracker.attempt(), wait);
                tokio::time::sleep(wait).await;
            }
            RetryDecision::GiveUp { attempts, elapsed } => {
                println!("  giving up: {} attempts in {:?}", attempts, elapsed);
                break;
            }
        }
    }
    Ok(())
}

/// Example 3: retry only recoverable session errors.
async fn example_async_driver() -> Result<(), ConfigError> {
    println!("\n=== Example 3: Async Driver ===");

    let policy = BoundExponentialBackoffRetryPolicy::new(
        Duration::from_millis(10),
        Duration::from_millis(100),
        5,
    )?;
    let calls = Arc::new(AtomicU32::new(0));

    let result = retry_if(
        &policy,
        || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                println!("  connecting (call {})", n + 1);
                match n {
                    0 | 1 => Err(SessionError::ConnectionLoss),
                    _ => Ok("connected"),
                }
            }
        },
        |err| *err == SessionError::ConnectionLoss,
    )
    .await;
    println!("  result: {:?}", result);

    let expired = retry_if(
        &policy,
        || async { Err::<(), _>(SessionError::SessionExpired) },
        |err| *err == SessionError::ConnectionLoss,
    )
    .await;
    if let Err(exhausted) = expired {
        println!(
            "  not retried: {:?} after {} attempt(s)",
            exhausted.final_error, exhausted.attempts
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), ConfigError> {
    example_manual_loop()?;
    example_tracker().await?;
    example_async_driver().await?;
    Ok(())
}
