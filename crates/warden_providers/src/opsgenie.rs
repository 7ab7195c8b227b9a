//! Opsgenie schedule timeline client.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{DutyPeriod, TimeWindow};
use warden_error::{ProviderError, ProviderErrorKind};
use warden_interface::DutyProvider;

use crate::http::{decode, send};

/// Default API endpoint.
pub const OPSGENIE_BASE_URL: &str = "https://api.opsgenie.com";

/// Timeline response of `GET /v2/schedules/{id}/timeline`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleTimeline {
    /// Response payload
    pub data: TimelineData,
}

/// Timeline payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineData {
    /// Timeline after overrides are applied
    #[serde(default)]
    pub final_timeline: FinalTimeline,
}

/// Rotations of the final timeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinalTimeline {
    /// One entry per rotation
    #[serde(default)]
    pub rotations: Vec<Rotation>,
}

/// A rotation and its periods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rotation {
    /// Rotation name
    #[serde(default)]
    pub name: String,
    /// On-call periods
    #[serde(default)]
    pub periods: Vec<Period>,
}

/// One on-call period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    /// Inclusive start
    pub start_date: DateTime<Utc>,
    /// Exclusive end
    pub end_date: DateTime<Utc>,
    /// Person on call, absent for gaps
    #[serde(default)]
    pub recipient: Option<Recipient>,
}

/// Who is on call during a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    /// Username
    pub name: String,
}

/// Convert a timeline into duty periods, skipping periods without recipient.
///
/// Periods are returned in timeline order; sorting and joining is left to
/// the aggregator.
pub fn timeline_periods(timeline: &ScheduleTimeline) -> Vec<DutyPeriod> {
    timeline
        .data
        .final_timeline
        .rotations
        .iter()
        .flat_map(|rotation| rotation.periods.iter())
        .filter_map(|period| {
            let recipient = period.recipient.as_ref()?;
            Some(DutyPeriod::new(
                recipient.name.clone(),
                period.start_date,
                period.end_date,
            ))
        })
        .collect()
}

/// Whole days needed to cover `window`, rounded up.
pub fn interval_days(window: &TimeWindow) -> Result<i64, ProviderError> {
    let seconds = window.length().num_seconds();
    if seconds < 0 {
        return Err(ProviderError::new(ProviderErrorKind::InvalidRequest(format!(
            "window ends before it starts: {}",
            window
        ))));
    }
    const DAY: i64 = 24 * 60 * 60;
    Ok((seconds + DAY - 1) / DAY)
}

/// Opsgenie client authenticated with an API key.
#[derive(Debug, Clone)]
pub struct OpsgenieClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpsgenieClient {
    /// Create a client against `base_url`, [`OPSGENIE_BASE_URL`] in production.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Fetch the timeline of one schedule.
    #[tracing::instrument(skip(self), fields(window = %window))]
    pub async fn timeline(
        &self,
        schedule_id: &str,
        window: TimeWindow,
    ) -> Result<ScheduleTimeline, ProviderError> {
        let url = format!("{}/v2/schedules/{}/timeline", self.base_url, schedule_id);
        let interval = interval_days(&window)?;
        tracing::debug!(url = %url, interval, "Requesting schedule timeline");

        let request = self
            .client
            .get(&url)
            .header("Authorization", format!("GenieKey {}", self.api_key))
            .query(&[
                ("identifierType", "id".to_string()),
                ("interval", interval.to_string()),
                ("intervalUnit", "days".to_string()),
                ("date", window.from.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ]);

        let body = send(request).await?;
        decode(&body)
    }
}

#[async_trait]
impl DutyProvider for OpsgenieClient {
    async fn duty_periods(
        &self,
        schedule_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<DutyPeriod>, ProviderError> {
        let timeline = self.timeline(schedule_id, window).await?;
        let periods = timeline_periods(&timeline);
        tracing::debug!(schedule_id, count = periods.len(), "Duty periods decoded");
        Ok(periods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    const TIMELINE: &str = r#"{
        "data": {
            "_parent": {"id": "s1", "name": "Ops"},
            "startDate": "2024-03-05T00:00:00Z",
            "endDate": "2024-03-06T00:00:00Z",
            "finalTimeline": {
                "rotations": [
                    {
                        "id": "r1",
                        "name": "day",
                        "order": 1,
                        "periods": [
                            {"startDate": "2024-03-05T00:00:00Z", "endDate": "2024-03-05T09:00:00Z", "type": "default", "recipient": {"id": "u1", "type": "user", "name": "ann@example.com"}},
                            {"startDate": "2024-03-05T09:00:00Z", "endDate": "2024-03-05T18:00:00Z", "type": "default"}
                        ]
                    },
                    {
                        "id": "r2",
                        "name": "night",
                        "periods": [
                            {"startDate": "2024-03-05T18:00:00Z", "endDate": "2024-03-06T09:00:00Z", "type": "override", "recipient": {"id": "u2", "type": "user", "name": "bob@example.com"}}
                        ]
                    }
                ]
            }
        },
        "took": 0.05,
        "requestId": "abc"
    }"#;

    #[test]
    fn test_timeline_periods_skip_gaps() {
        let timeline: ScheduleTimeline = decode(TIMELINE).unwrap();
        let periods = timeline_periods(&timeline);

        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].name(), "ann@example.com");
        assert_eq!(*periods[0].start(), Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
        assert_eq!(periods[1].name(), "bob@example.com");
        assert_eq!(*periods[1].end(), Utc.with_ymd_and_hms(2024, 3, 6, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_empty_timeline() {
        let timeline: ScheduleTimeline = decode(r#"{"data": {}}"#).unwrap();
        assert!(timeline_periods(&timeline).is_empty());
    }

    #[test]
    fn test_interval_days_rounds_up() {
        let from = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
        assert_eq!(interval_days(&TimeWindow::day_from(from)).unwrap(), 1);
        assert_eq!(
            interval_days(&TimeWindow::starting_at(from, Duration::hours(75))).unwrap(),
            4
        );
        assert_eq!(
            interval_days(&TimeWindow::starting_at(from, Duration::zero())).unwrap(),
            0
        );
        assert!(interval_days(&TimeWindow::starting_at(from, Duration::hours(-1))).is_err());
    }
}
