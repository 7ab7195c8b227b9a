//! PagerDuty schedule entries client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{DutyPeriod, TimeWindow};
use warden_error::ProviderError;
use warden_interface::DutyProvider;

use crate::http::{decode, send};

/// Time zone sent when none is configured.
pub const PAGERDUTY_DEFAULT_TIME_ZONE: &str = "UTC";

/// Date format of the `since` and `until` parameters.
const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Base URL of the account living at `subdomain`.
pub fn pagerduty_base_url(subdomain: &str) -> String {
    format!("https://{}.pagerduty.com", subdomain.trim())
}

/// Response of `GET /api/v1/schedules/{id}/entries`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleEntries {
    /// Rendered entries, overrides included
    #[serde(default)]
    pub entries: Vec<ScheduleEntry>,
}

/// One rendered schedule entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Inclusive start, RFC 3339 in the requested zone
    pub start: DateTime<Utc>,
    /// Exclusive end
    pub end: DateTime<Utc>,
    /// Person on call
    pub user: ScheduleUser,
}

/// User attached to an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleUser {
    /// Display name
    pub name: String,
}

/// Convert schedule entries into duty periods, keeping response order.
pub fn entry_periods(entries: &ScheduleEntries) -> Vec<DutyPeriod> {
    entries
        .entries
        .iter()
        .map(|entry| DutyPeriod::new(entry.user.name.clone(), entry.start, entry.end))
        .collect()
}

/// PagerDuty client authenticated with an API token.
#[derive(Debug, Clone)]
pub struct PagerdutyClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    time_zone: String,
}

impl PagerdutyClient {
    /// Create a client against `base_url`, usually [`pagerduty_base_url`].
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            time_zone: PAGERDUTY_DEFAULT_TIME_ZONE.to_string(),
        }
    }

    /// Zone the entries are rendered in.
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = time_zone.into();
        self
    }

    /// Fetch the entries of one schedule.
    #[tracing::instrument(skip(self), fields(window = %window))]
    pub async fn entries(
        &self,
        schedule_id: &str,
        window: TimeWindow,
    ) -> Result<ScheduleEntries, ProviderError> {
        let url = format!("{}/api/v1/schedules/{}/entries", self.base_url, schedule_id);
        tracing::debug!(url = %url, time_zone = %self.time_zone, "Requesting schedule entries");

        let request = self
            .client
            .get(&url)
            .header("Authorization", format!("Token token={}", self.token))
            .query(&[
                ("since", window.from.format(QUERY_DATE_FORMAT).to_string()),
                ("until", window.to.format(QUERY_DATE_FORMAT).to_string()),
                ("time_zone", self.time_zone.clone()),
            ]);

        let body = send(request).await?;
        decode(&body)
    }
}

#[async_trait]
impl DutyProvider for PagerdutyClient {
    async fn duty_periods(
        &self,
        schedule_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<DutyPeriod>, ProviderError> {
        let entries = self.entries(schedule_id, window).await?;
        let periods = entry_periods(&entries);
        tracing::debug!(schedule_id, count = periods.len(), "Duty periods decoded");
        Ok(periods)
    }
}
