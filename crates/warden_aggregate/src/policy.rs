//! Retry and timeout settings for upstream calls.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};

/// How upstream calls are bounded and retried.
///
/// Deserializes from the `[retry]` configuration section; every field has a
/// default.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters, derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct RetryPolicy {
    /// Total attempts per call, the first one included
    #[serde(default = "default_max_attempts")]
    #[builder(default = "default_max_attempts()")]
    max_attempts: usize,

    /// Delay before the first retry (milliseconds)
    #[serde(default = "default_initial_backoff_ms")]
    #[builder(default = "default_initial_backoff_ms()")]
    initial_backoff_ms: u64,

    /// Upper bound for a single delay (milliseconds)
    #[serde(default = "default_max_backoff_ms")]
    #[builder(default = "default_max_backoff_ms()")]
    max_backoff_ms: u64,

    /// Bound for one upstream call (seconds)
    #[serde(default = "default_call_timeout_secs")]
    #[builder(default = "default_call_timeout_secs()")]
    call_timeout_secs: u64,
}

fn default_max_attempts() -> usize {
    3
}

fn default_initial_backoff_ms() -> u64 {
    200
}

fn default_max_backoff_ms() -> u64 {
    2_000
}

fn default_call_timeout_secs() -> u64 {
    10
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

impl RetryPolicy {
    /// Bound for one upstream call.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Delays between attempts: `initial`, `2 * initial`, `4 * initial`, ...
    ///
    /// Yields `max_attempts - 1` delays since the first attempt is not a retry.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        // from_millis(2) raises 2 to the attempt number; factor scales it.
        ExponentialBackoff::from_millis(2)
            .factor((self.initial_backoff_ms / 2).max(1))
            .max_delay(Duration::from_millis(self.max_backoff_ms))
            .map(jitter)
            .take(self.max_attempts.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(*policy.max_attempts(), 3);
        assert_eq!(policy.call_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_delays_count_excludes_first_attempt() {
        let policy = RetryPolicy::default().with_max_attempts(4);
        assert_eq!(policy.delays().count(), 3);

        let single = RetryPolicy::default().with_max_attempts(1);
        assert_eq!(single.delays().count(), 0);
    }

    #[test]
    fn test_delays_are_capped() {
        let policy = RetryPolicy::default()
            .with_max_attempts(10)
            .with_max_backoff_ms(500);
        assert!(policy.delays().all(|d| d <= Duration::from_millis(500)));
    }

    #[test]
    fn test_builder_fills_defaults() {
        let policy = RetryPolicyBuilder::default()
            .max_attempts(5)
            .build()
            .unwrap();
        assert_eq!(*policy.max_attempts(), 5);
        assert_eq!(*policy.initial_backoff_ms(), 200);
    }
}
