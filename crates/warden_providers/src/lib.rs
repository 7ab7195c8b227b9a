//! Upstream clients.
//!
//! - [`OpsgenieClient`] implements [`warden_interface::DutyProvider`] over the schedule timeline API
//! - [`PagerdutyClient`] implements [`warden_interface::DutyProvider`] over the schedule entries API
//! - [`JiraClient`] implements [`warden_interface::TimelogProvider`] over the raw timesheet API
//! - [`SlackClient`] implements [`warden_interface::Messenger`]
//!
//! Each client issues exactly one request per call; retries and timeouts
//! are applied by the aggregators.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod http;
mod jira;
mod opsgenie;
mod pagerduty;
mod slack;

pub use jira::{JiraClient, Timesheet, TimesheetEntry, WorklogItem, total_time_spent};
pub use opsgenie::{
    FinalTimeline, OPSGENIE_BASE_URL, OpsgenieClient, Period, Recipient, Rotation, ScheduleTimeline,
    TimelineData, interval_days, timeline_periods,
};
pub use pagerduty::{
    PAGERDUTY_DEFAULT_TIME_ZONE, PagerdutyClient, ScheduleEntries, ScheduleEntry, ScheduleUser,
    entry_periods, pagerduty_base_url,
};
pub use slack::{SLACK_API_URL, SlackClient, SlackPayload};
