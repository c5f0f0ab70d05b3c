use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use sitewatch_engine::{retry_with_backoff, RetryPolicy};

fn policy(attempts: u32, initial: Duration, factor: f64) -> RetryPolicy {
    RetryPolicy {
        attempts,
        initial_delay: initial,
        backoff_factor: factor,
    }
}

#[tokio::test(start_paused = true)]
async fn waits_the_sum_of_backoff_delays_before_succeeding() {
    let calls = AtomicU32::new(0);
    let started = tokio::time::Instant::now();

    let result: Result<u32, String> =
        retry_with_backoff(&policy(4, Duration::from_secs(1), 2.0), || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if attempt <= 2 {
                    Err(format!("transient {attempt}"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

    assert_eq!(result, Ok(3));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Two failed attempts pause for 1s then 2s; the success adds nothing.
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn first_try_success_skips_every_delay() {
    let started = tokio::time::Instant::now();

    let result: Result<&str, String> =
        retry_with_backoff(&policy(5, Duration::from_secs(10), 2.0), || async {
            Ok("immediate")
        })
        .await;

    assert_eq!(result, Ok("immediate"));
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn single_attempt_policy_fails_without_sleeping() {
    let calls = AtomicU32::new(0);
    let started = tokio::time::Instant::now();

    let result: Result<(), String> =
        retry_with_backoff(&policy(1, Duration::from_secs(30), 2.0), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("permanent".to_owned()) }
        })
        .await;

    assert_eq!(result, Err("permanent".to_owned()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn zero_attempts_still_runs_the_operation_once() {
    let calls = AtomicU32::new(0);

    let result: Result<(), String> =
        retry_with_backoff(&policy(0, Duration::from_secs(1), 2.0), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("no luck".to_owned()) }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn delay_growth_is_capped() {
    let calls = AtomicU32::new(0);
    let started = tokio::time::Instant::now();

    let result: Result<(), String> =
        retry_with_backoff(&policy(3, Duration::from_secs(200), 10.0), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("still down".to_owned()) }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // 200s for the first pause, then the cap holds the second at 300s.
    assert_eq!(started.elapsed(), Duration::from_secs(500));
}

#[tokio::test(start_paused = true)]
async fn sub_one_factor_does_not_shrink_the_delay() {
    let started = tokio::time::Instant::now();

    let result: Result<(), String> =
        retry_with_backoff(&policy(3, Duration::from_secs(4), 0.25), || async {
            Err("nope".to_owned())
        })
        .await;

    assert!(result.is_err());
    // The factor is floored at 1.0, so both pauses stay at 4s.
    assert_eq!(started.elapsed(), Duration::from_secs(8));
}
