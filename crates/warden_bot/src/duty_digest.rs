//! Morning "who is on duty" message.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use warden_aggregate::DutyAggregator;
use warden_core::{
    DutyPeriod, TIME_FORMAT, TeamMember, TimeWindow, group_by_name, midnight, render_on_duty,
    split_current_and_next,
};
use warden_error::WardenResult;
use warden_interface::Messenger;

use crate::DailyJob;

/// How far ahead the digest looks, counted from today's midnight.
///
/// Covers a Friday morning up to Monday morning.
pub const DUTY_DIGEST_HORIZON_HOURS: i64 = 75;

/// Personal heads-up listing every upcoming period of one person.
pub fn render_duty_notice(name: &str, periods: &[DutyPeriod]) -> Option<String> {
    if periods.is_empty() {
        return None;
    }
    let spans: Vec<String> = periods
        .iter()
        .map(|p| {
            format!(
                "from {} to {}",
                p.start().format(TIME_FORMAT),
                p.end().format(TIME_FORMAT)
            )
        })
        .collect();
    Some(format!(
        "Hello, {}! You are on duty {}. Enjoy!",
        name,
        spans.join(" and ")
    ))
}

/// Posts the duty roster to the channel and notifies upcoming people.
pub struct DutyDigest {
    aggregator: DutyAggregator,
    schedule_ids: Vec<String>,
    team: Vec<TeamMember>,
    channel: String,
    messenger: Arc<dyn Messenger>,
}

impl DutyDigest {
    /// Create a digest for `schedule_ids` posted to `channel`.
    pub fn new(
        aggregator: DutyAggregator,
        schedule_ids: Vec<String>,
        team: Vec<TeamMember>,
        channel: impl Into<String>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            aggregator,
            schedule_ids,
            team,
            channel: channel.into(),
            messenger,
        }
    }

    async fn notify(&self, upcoming: &[DutyPeriod]) {
        let notices = group_by_name(upcoming)
            .into_iter()
            .filter_map(|(name, periods)| {
                let Some(member) = self.team.iter().find(|m| m.name == name) else {
                    tracing::debug!(name = %name, "Person on duty is not in the team");
                    return None;
                };
                let text = render_duty_notice(&member.name, &periods)?;
                Some((member.slack_handle(), text))
            })
            .collect::<Vec<_>>();

        let sends = notices.iter().map(|(handle, text)| async move {
            if let Err(e) = self.messenger.send_message(handle, text).await {
                tracing::warn!(to = %handle, error = %e, "Failed to send duty notice");
            }
        });
        join_all(sends).await;
    }
}

#[async_trait]
impl DailyJob for DutyDigest {
    fn name(&self) -> &str {
        "duty digest"
    }

    #[tracing::instrument(skip(self), fields(schedules = self.schedule_ids.len()))]
    async fn run(&self, now: DateTime<Utc>) -> WardenResult<()> {
        let window = TimeWindow::starting_at(
            midnight(now.date_naive()),
            Duration::hours(DUTY_DIGEST_HORIZON_HOURS),
        );
        let periods = self
            .aggregator
            .users_on_duty(window, &self.schedule_ids, &CancellationToken::new())
            .await?;

        let Some((current, next)) = split_current_and_next(now, &periods) else {
            tracing::info!("No users on duty found");
            return Ok(());
        };

        self.notify(&next).await;

        let text = render_on_duty(Some(&current), &next);
        self.messenger.send_message(&self.channel, &text).await?;
        tracing::info!(current = %current.name(), next = next.len(), "Duty digest posted");
        Ok(())
    }
}
