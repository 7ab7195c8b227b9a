//! Duty schedule aggregation.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use warden_core::{DutyPeriod, TimeWindow, join_periods};
use warden_error::{AggregateError, AggregateErrorKind};
use warden_interface::DutyProvider;

use crate::fanout::{FanOut, unit_error};

/// Collects on-duty periods from several schedules.
#[derive(Clone)]
pub struct DutyAggregator {
    provider: Arc<dyn DutyProvider>,
    call_timeout: Duration,
}

impl DutyAggregator {
    /// Create an aggregator bounding every schedule request by `call_timeout`.
    pub fn new(provider: Arc<dyn DutyProvider>, call_timeout: Duration) -> Self {
        Self {
            provider,
            call_timeout,
        }
    }

    /// Fetch every schedule concurrently and join the combined periods.
    ///
    /// All schedules are awaited even after one has failed. If any failed,
    /// the error of the schedule listed first in `schedule_ids` is returned
    /// and no periods are. On success the periods of all schedules are
    /// sorted by start, ties keeping schedule order, and joined.
    #[tracing::instrument(skip(self, schedule_ids, cancel), fields(window = %window, schedules = schedule_ids.len()))]
    pub async fn users_on_duty(
        &self,
        window: TimeWindow,
        schedule_ids: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<DutyPeriod>, AggregateError> {
        let mut fan_out = FanOut::new();
        for schedule_id in schedule_ids {
            let provider = Arc::clone(&self.provider);
            let schedule_id = schedule_id.clone();
            let call_timeout = self.call_timeout;
            fan_out.spawn(schedule_id.clone(), async move {
                let periods =
                    tokio::time::timeout(call_timeout, provider.duty_periods(&schedule_id, window))
                        .await
                        .map_err(|_| {
                            unit_error(
                                &schedule_id,
                                AggregateErrorKind::TimedOut(call_timeout).to_string(),
                            )
                        })?
                        .map_err(|e| unit_error(&schedule_id, e.kind.to_string()))?;
                tracing::debug!(schedule_id = %schedule_id, count = periods.len(), "Schedule fetched");
                Ok(periods)
            });
        }

        let mut periods = Vec::new();
        let mut first_error = None;
        for outcome in fan_out.collect(cancel).await? {
            match outcome {
                Ok(mut unit) if first_error.is_none() => periods.append(&mut unit),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e.kind, "Schedule request failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(error) = first_error {
            return Err(error);
        }

        let joined = join_periods(periods);
        tracing::debug!(count = joined.len(), "Duty periods joined");
        Ok(joined)
    }
}
