//! Morning "log your time" message.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use warden_aggregate::TimelogAggregator;
use warden_core::{TeamMember, format_time_spent, previous_working_day, render_time_logs};
use warden_error::WardenResult;
use warden_interface::Messenger;

use crate::DailyJob;

/// Personal reminder for someone below `minimum`.
pub fn render_timelog_reminder(first_name: &str, time_spent: Duration, minimum: Duration) -> String {
    let logged = if time_spent.is_zero() {
        "You didn't log any time".to_string()
    } else {
        format!("You logged only {}", format_time_spent(time_spent))
    };
    format!(
        "Hi, {}! {} for yesterday. Could you please log at least {} hours?",
        first_name,
        logged,
        minimum.as_secs() / 3600
    )
}

/// Posts who under-logged time and reminds each of them personally.
pub struct TimelogDigest {
    aggregator: TimelogAggregator,
    team: Vec<TeamMember>,
    minimum: Duration,
    channel: String,
    messenger: Arc<dyn Messenger>,
}

impl TimelogDigest {
    /// Create a digest checking `team` against `minimum`, posted to `channel`.
    pub fn new(
        aggregator: TimelogAggregator,
        team: Vec<TeamMember>,
        minimum: Duration,
        channel: impl Into<String>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            aggregator,
            team,
            minimum,
            channel: channel.into(),
            messenger,
        }
    }
}

#[async_trait]
impl DailyJob for TimelogDigest {
    fn name(&self) -> &str {
        "timelog digest"
    }

    #[tracing::instrument(skip(self), fields(team = self.team.len()))]
    async fn run(&self, now: DateTime<Utc>) -> WardenResult<()> {
        let window = previous_working_day(now);
        let logins: Vec<String> = self.team.iter().map(|m| m.jira_login.clone()).collect();
        let report = self
            .aggregator
            .users_logged_less_than(&logins, window, self.minimum, &CancellationToken::new())
            .await?;

        let below: Vec<(&TeamMember, Duration)> = report
            .below_minimum()
            .iter()
            .filter_map(|r| {
                let member = self.team.iter().find(|m| &m.jira_login == r.user())?;
                Some((member, *r.time_spent()))
            })
            .collect();

        let reminders = below.iter().map(|(member, time_spent)| async move {
            let text = render_timelog_reminder(member.first_name(), *time_spent, self.minimum);
            let handle = member.slack_handle();
            if let Err(e) = self.messenger.send_message(&handle, &text).await {
                tracing::warn!(to = %handle, error = %e, "Failed to send timelog reminder");
            }
        });
        join_all(reminders).await;

        let mut text = String::new();
        if let Some(error) = report.error() {
            let _ = writeln!(text, "{}", error.kind);
        }
        if !below.is_empty() {
            let handles: Vec<(String, Duration)> = below
                .iter()
                .map(|(member, time_spent)| (member.slack_handle(), *time_spent))
                .collect();
            text.push_str(":alarm_clock: Time logs:\n");
            for line in render_time_logs(handles.iter().map(|(h, d)| (h.as_str(), *d))).lines() {
                let _ = writeln!(text, "\t{}", line);
            }
        }

        if text.is_empty() {
            tracing::info!("Everybody logged enough time");
            return Ok(());
        }

        self.messenger.send_message(&self.channel, &text).await?;
        tracing::info!(below = below.len(), "Timelog digest posted");
        Ok(())
    }
}
