//! Jira timesheet client.

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use warden_core::{DATE_FORMAT, TimeWindow};
use warden_error::{ProviderError, ProviderErrorKind};
use warden_interface::TimelogProvider;

use crate::http::{decode, send};

const TIMESHEET_PATH: &str = "/rest/timesheet-gadget/1.0/raw-timesheet.json";

/// Response of the raw timesheet endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timesheet {
    /// Issues with logged work
    #[serde(default)]
    pub worklog: Vec<WorklogItem>,
}

/// Work logged against one issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorklogItem {
    /// Issue key
    #[serde(default)]
    pub key: String,
    /// Individual worklog entries
    #[serde(default)]
    pub entries: Vec<TimesheetEntry>,
}

/// One worklog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntry {
    /// Logged time in seconds
    pub time_spent: u64,
    /// Login of the person who logged the time
    pub author: String,
}

/// Sum of all entries of `timesheet`, which must all belong to `user`.
pub fn total_time_spent(user: &str, timesheet: &Timesheet) -> Result<Duration, ProviderError> {
    let mut total = Duration::ZERO;
    for entry in timesheet.worklog.iter().flat_map(|item| item.entries.iter()) {
        if entry.author != user {
            return Err(ProviderError::new(ProviderErrorKind::AuthorMismatch {
                author: entry.author.clone(),
                user: user.to_string(),
            }));
        }
        total += Duration::from_secs(entry.time_spent);
    }
    Ok(total)
}

/// Jira client authenticated with a basic auth token.
#[derive(Debug, Clone)]
pub struct JiraClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl JiraClient {
    /// Create a client against `base_url`, e.g. `https://jira.example.com`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Fetch the raw timesheet of `user` for `window`.
    ///
    /// The endpoint takes inclusive dates, so the last day requested is the
    /// one containing the last second of the window.
    #[tracing::instrument(skip(self), fields(window = %window))]
    pub async fn timesheet(&self, user: &str, window: TimeWindow) -> Result<Timesheet, ProviderError> {
        let url = format!("{}{}", self.base_url, TIMESHEET_PATH);
        let last_second = window.to - ChronoDuration::seconds(1);

        let request = self
            .client
            .get(&url)
            .header("Authorization", format!("Basic {}", self.token))
            .query(&[
                ("targetUser", user.to_string()),
                ("startDate", window.from.format(DATE_FORMAT).to_string()),
                ("endDate", last_second.format(DATE_FORMAT).to_string()),
            ]);

        let body = send(request).await?;
        decode(&body)
    }
}

#[async_trait]
impl TimelogProvider for JiraClient {
    async fn time_spent(&self, user: &str, window: TimeWindow) -> Result<Duration, ProviderError> {
        let timesheet = self.timesheet(user, window).await?;
        let total = total_time_spent(user, &timesheet)?;
        tracing::debug!(user, total = ?total, "Timesheet summed");
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(author: &str, seconds: u64) -> TimesheetEntry {
        TimesheetEntry {
            time_spent: seconds,
            author: author.into(),
        }
    }

    #[test]
    fn test_total_time_spent_sums_all_issues() {
        let timesheet = Timesheet {
            worklog: vec![
                WorklogItem {
                    key: "OPS-1".into(),
                    entries: vec![entry("ann", 3600), entry("ann", 1800)],
                },
                WorklogItem {
                    key: "OPS-2".into(),
                    entries: vec![entry("ann", 600)],
                },
            ],
        };
        assert_eq!(total_time_spent("ann", &timesheet).unwrap(), Duration::from_secs(6000));
    }

    #[test]
    fn test_empty_timesheet_is_zero() {
        let timesheet: Timesheet = decode(r#"{"startDate": 1, "endDate": 2}"#).unwrap();
        assert_eq!(total_time_spent("ann", &timesheet).unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_foreign_entry_is_rejected() {
        let timesheet = Timesheet {
            worklog: vec![WorklogItem {
                key: "OPS-1".into(),
                entries: vec![entry("ann", 60), entry("bob", 60)],
            }],
        };
        let err = total_time_spent("ann", &timesheet).unwrap_err();
        assert_eq!(
            err.kind,
            ProviderErrorKind::AuthorMismatch {
                author: "bob".into(),
                user: "ann".into(),
            }
        );
    }
}
