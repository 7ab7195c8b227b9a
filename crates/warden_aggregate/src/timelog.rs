//! Time log aggregation.

use derive_getters::Getters;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry2::{Retry, RetryError};
use tokio_util::sync::CancellationToken;
use warden_core::{TimeLogResult, TimeWindow};
use warden_error::{AggregateError, AggregateErrorKind, ProviderError};
use warden_interface::TimelogProvider;

use crate::RetryPolicy;
use crate::fanout::{FanOut, unit_error};

/// Users under the threshold plus every per-user failure.
///
/// A report with failures is still usable: `below_minimum` holds the users
/// whose time could be determined.
#[derive(Debug, Clone, Default, Getters)]
pub struct TimelogReport {
    /// Users that logged less than the minimum, in the order they were given
    below_minimum: Vec<TimeLogResult>,
    /// Per-user failures, in the order the users were given
    failures: Vec<AggregateError>,
}

impl TimelogReport {
    /// Whether every user could be checked.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// All failures combined into one error.
    ///
    /// A single failure is returned as is; several are joined into
    /// [`AggregateErrorKind::Multiple`].
    pub fn error(&self) -> Option<AggregateError> {
        match self.failures.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            many => Some(AggregateError::new(AggregateErrorKind::Multiple(
                many.iter().map(|e| e.kind.to_string()).collect(),
            ))),
        }
    }
}

/// Why one attempt did not produce a usable duration.
#[derive(Debug)]
enum AttemptError {
    /// Upstream answered zero, which may not be settled yet
    Empty,
    /// The call took longer than the call timeout
    TimedOut(Duration),
    /// The provider failed
    Provider(ProviderError),
}

/// Checks the logged time of several users.
#[derive(Clone)]
pub struct TimelogAggregator {
    provider: Arc<dyn TimelogProvider>,
    policy: RetryPolicy,
}

impl TimelogAggregator {
    /// Create an aggregator calling `provider` under `policy`.
    pub fn new(provider: Arc<dyn TimelogProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Fetch every user's logged time concurrently and keep those below `minimum`.
    ///
    /// Each user is retried on transport errors, timeouts and zero results
    /// until the attempt budget runs out. A zero that persists through all
    /// attempts is a real zero. Fails only on cancellation; per-user
    /// failures are reported in the returned [`TimelogReport`].
    #[tracing::instrument(skip(self, users, cancel), fields(window = %window, users = users.len(), minimum = ?minimum))]
    pub async fn users_logged_less_than(
        &self,
        users: &[String],
        window: TimeWindow,
        minimum: Duration,
        cancel: &CancellationToken,
    ) -> Result<TimelogReport, AggregateError> {
        let mut fan_out = FanOut::new();
        for user in users {
            let provider = Arc::clone(&self.provider);
            let policy = self.policy.clone();
            let user = user.clone();
            fan_out.spawn(user.clone(), async move {
                let time_spent = time_spent_with_retry(provider, &policy, &user, window).await?;
                tracing::debug!(user = %user, time_spent = ?time_spent, "Time log fetched");
                Ok(TimeLogResult::new(user, time_spent))
            });
        }

        let mut report = TimelogReport::default();
        for outcome in fan_out.collect(cancel).await? {
            match outcome {
                Ok(result) if *result.time_spent() < minimum => report.below_minimum.push(result),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e.kind, "Time log request failed");
                    report.failures.push(e);
                }
            }
        }

        Ok(report)
    }
}

async fn time_spent_with_retry(
    provider: Arc<dyn TimelogProvider>,
    policy: &RetryPolicy,
    user: &str,
    window: TimeWindow,
) -> Result<Duration, AggregateError> {
    let call_timeout = policy.call_timeout();

    let outcome = Retry::spawn(policy.delays(), || {
        let provider = Arc::clone(&provider);
        async move {
            let attempt = tokio::time::timeout(call_timeout, provider.time_spent(user, window)).await;
            match attempt {
                Ok(Ok(time_spent)) if time_spent.is_zero() => {
                    tracing::debug!(user, "Zero time logged, will retry");
                    Err(RetryError::Transient {
                        err: AttemptError::Empty,
                        retry_after: None,
                    })
                }
                Ok(Ok(time_spent)) => Ok(time_spent),
                Ok(Err(e)) if e.is_transient() => {
                    tracing::warn!(user, error = %e.kind, "Time log request failed, will retry");
                    Err(RetryError::Transient {
                        err: AttemptError::Provider(e),
                        retry_after: None,
                    })
                }
                Ok(Err(e)) => Err(RetryError::Permanent(AttemptError::Provider(e))),
                Err(_) => {
                    tracing::warn!(user, timeout = ?call_timeout, "Time log request timed out, will retry");
                    Err(RetryError::Transient {
                        err: AttemptError::TimedOut(call_timeout),
                        retry_after: None,
                    })
                }
            }
        }
    })
    .await;

    match outcome {
        Ok(time_spent) => Ok(time_spent),
        Err(AttemptError::Empty) => Ok(Duration::ZERO),
        Err(AttemptError::TimedOut(after)) => {
            Err(unit_error(user, AggregateErrorKind::TimedOut(after).to_string()))
        }
        Err(AttemptError::Provider(e)) => Err(unit_error(user, e.kind.to_string())),
    }
}
