//! Demonstrates tracing integration with the retry policies
//!
//! Run with: cargo run --example tracing_demo --features async,tracing

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use backoff_policy::retry::retry;
use backoff_policy::{
    BoundExponentialBackoffRetryPolicy, ConfigError, ExponentialBackOffWithDeadlinePolicy,
    RetryPolicy,
};

#[tokio::main]
async fn main() -> Result<(), ConfigError> {
    // Set up tracing subscriber; TRACE shows every computed wait
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    tracing::info!("Starting tracing demo");

    // Policy decisions are traced as they are computed
    let bounded = BoundExponentialBackoffRetryPolicy::new(
        Duration::from_millis(10),
        Duration::from_millis(40),
        4,
    )?;
    for attempt in 0..=4 {
        let wait = bounded.next_retry_wait(attempt, Duration::ZERO);
        tracing::info!(attempt, ?wait, "bounded policy advised");
    }

    // The driver logs each retry and the final give-up
    let deadline = ExponentialBackOffWithDeadlinePolicy::new(
        Duration::from_millis(10),
        Duration::from_millis(100),
        10,
    )?;
    let calls = Arc::new(AtomicU32::new(0));
    let result = retry(&deadline, || {
        let calls = calls.clone();
        async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(format!("connection loss #{}", n + 1))
        }
    })
    .await;

    if let Err(exhausted) = result {
        tracing::info!(
            attempts = exhausted.attempts,
            total = ?exhausted.total_duration,
            "demo finished: {}",
            exhausted.final_error
        );
    }

    Ok(())
}
