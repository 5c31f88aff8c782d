//! Retry policy implementation

use crate::error::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry settings as they appear in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Multiplier of the exponential ceiling, in seconds
    #[serde(default = "default_multiplier_secs")]
    pub multiplier_secs: f64,

    /// Upper bound for any single delay, in seconds
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: f64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_multiplier_secs() -> f64 {
    1.0
}

fn default_max_backoff_secs() -> f64 {
    30.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            multiplier_secs: default_multiplier_secs(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

/// Randomized exponential backoff, bounded by attempt count.
///
/// ```text
/// ceiling(n) = min(max_backoff, multiplier * 2^(n-1))
/// delay(n)   = uniform(0, ceiling(n))
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    multiplier: Duration,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, multiplier: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            multiplier,
            max_backoff,
        }
    }

    /// Create a policy from config values
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_secs_f64(config.multiplier_secs.max(0.0)),
            Duration::from_secs_f64(config.max_backoff_secs.max(0.0)),
        )
    }

    /// A policy that tries exactly once
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Maximum attempts, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound of the delay after failed attempt `attempt` (1-indexed)
    pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self.multiplier.saturating_mul(2u32.saturating_pow(exponent));
        std::cmp::min(delay, self.max_backoff)
    }

    /// Randomized delay after failed attempt `attempt` (1-indexed)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ceiling = self.backoff_ceiling(attempt);
        if ceiling.is_zero() {
            return ceiling;
        }
        let secs = rand::thread_rng().gen_range(0.0..=ceiling.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent. The closure receives the 1-indexed attempt number.
    ///
    /// When the budget is spent the last transient error is returned.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        "Transient failure, attempt {}/{}, retrying in {:?}: {}",
                        attempt, self.max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_retryable() {
                        warn!("Giving up after {} attempts: {}", attempt, e);
                    }
                    return Err(e);
                }
            }
        }
    }
}
