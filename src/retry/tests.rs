//! Tests for retry module

use super::*;
use crate::error::{Error, ErrorKind};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

fn instant_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::ZERO, Duration::ZERO)
}

// ============================================================================
// Backoff Tests
// ============================================================================

#[test]
fn test_backoff_ceiling_doubles_until_cap() {
    let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(10));
    assert_eq!(policy.backoff_ceiling(1), Duration::from_secs(1));
    assert_eq!(policy.backoff_ceiling(2), Duration::from_secs(2));
    assert_eq!(policy.backoff_ceiling(3), Duration::from_secs(4));
    assert_eq!(policy.backoff_ceiling(4), Duration::from_secs(8));
    assert_eq!(policy.backoff_ceiling(5), Duration::from_secs(10));
    assert_eq!(policy.backoff_ceiling(40), Duration::from_secs(10));
}

#[test]
fn test_backoff_is_jittered_within_ceiling() {
    let policy = RetryPolicy::new(10, Duration::from_millis(100), Duration::from_secs(5));
    for attempt in 1..8 {
        for _ in 0..50 {
            assert!(policy.backoff(attempt) <= policy.backoff_ceiling(attempt));
        }
    }
}

#[test]
fn test_zero_multiplier_never_sleeps() {
    let policy = instant_policy(3);
    assert_eq!(policy.backoff(1), Duration::ZERO);
    assert_eq!(policy.backoff(3), Duration::ZERO);
}

#[test]
fn test_max_attempts_clamped() {
    assert_eq!(RetryPolicy::new(0, Duration::ZERO, Duration::ZERO).max_attempts(), 1);
    assert_eq!(RetryPolicy::no_retry().max_attempts(), 1);
}

#[test]
fn test_from_config() {
    let config = RetryConfig {
        max_attempts: 7,
        multiplier_secs: 0.5,
        max_backoff_secs: 3.0,
    };
    let policy = RetryPolicy::from_config(&config);
    assert_eq!(policy.max_attempts(), 7);
    assert_eq!(policy.backoff_ceiling(1), Duration::from_millis(500));
    assert_eq!(policy.backoff_ceiling(5), Duration::from_secs(3));
}

#[test]
fn test_retry_config_defaults_from_yaml() {
    let config: RetryConfig = serde_yaml::from_str("max_attempts: 2").unwrap();
    assert_eq!(config.max_attempts, 2);
    assert!((config.multiplier_secs - 1.0).abs() < f64::EPSILON);
    assert!((config.max_backoff_secs - 30.0).abs() < f64::EPSILON);
}

// ============================================================================
// run() Tests
// ============================================================================

#[tokio::test]
async fn test_run_succeeds_first_time() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let result = instant_policy(3)
        .run(move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Error>(42)
        })
        .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_run_recovers_after_transient_failures() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let result = instant_policy(3)
        .run(move |attempt| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(Error::transient("connection reset"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_run_surfaces_last_transient_error_when_exhausted() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let result: crate::error::Result<()> = instant_policy(4)
        .run(move |attempt| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Err(Error::transient(format!("timeout #{attempt}"))) }
        })
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transient);
    assert!(err.to_string().contains("timeout #4"));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_run_never_retries_data_errors() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let result: crate::error::Result<()> = instant_policy(5)
        .run(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::data("Error: Invalid ObjectType")) }
        })
        .await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Data);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_run_never_retries_protocol_errors() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let result: crate::error::Result<()> = instant_policy(5)
        .run(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::protocol("missing OverallStatus")) }
        })
        .await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Protocol);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
