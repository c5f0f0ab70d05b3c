use std::fmt;
use std::future::Future;
use std::time::Duration;

use sitewatch_logging::watch_debug;

/// Upper bound on a single backoff pause, whatever the growth factor says.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(300);

/// How often and how patiently an operation is retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts; values below 1 behave like 1.
    pub attempts: u32,
    /// Pause before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied to the pause after each failed attempt.
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
        }
    }
}

/// Runs `operation` until it succeeds or the attempt budget is spent.
///
/// Sleeps between attempts with exponentially growing delays; the final
/// failure is returned without a trailing sleep.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    E: fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = policy.attempts.max(1);
    let mut delay = policy.initial_delay.min(MAX_RETRY_DELAY);
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= attempts => return Err(err),
            Err(err) => {
                watch_debug!(
                    "attempt {}/{} failed ({}), retrying in {:?}",
                    attempt,
                    attempts,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                let grown = delay.as_secs_f64() * policy.backoff_factor.max(1.0);
                delay = Duration::from_secs_f64(grown.min(MAX_RETRY_DELAY.as_secs_f64()));
                attempt += 1;
            }
        }
    }
}
