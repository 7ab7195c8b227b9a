//! "Who under-logged time" query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use warden_aggregate::TimelogAggregator;
use warden_core::{
    TeamMember, TimeWindow, parse_date_argument, previous_working_day, render_nobody_below,
    render_time_logs,
};
use warden_error::{ArgumentError, WardenResult};

use crate::query::{QueryProcessor, QueryProcessorFactory, QueryState, not_initialized};

/// Reports team members that logged less than the minimum on a working day.
///
/// The window is the working day before the given date, `today` when no
/// argument is given.
pub struct TimelogQuery {
    aggregator: TimelogAggregator,
    team: Arc<[TeamMember]>,
    minimum: Duration,
    window: Option<TimeWindow>,
    state: QueryState,
}

impl TimelogQuery {
    /// Create a query over `team`.
    pub fn new(aggregator: TimelogAggregator, team: Arc<[TeamMember]>, minimum: Duration) -> Self {
        Self {
            aggregator,
            team,
            minimum,
            window: None,
            state: QueryState::Created,
        }
    }

    /// Resolved window, once initialized.
    pub fn window(&self) -> Option<TimeWindow> {
        self.window
    }

    fn display_name<'a>(&'a self, login: &'a str) -> &'a str {
        self.team
            .iter()
            .find(|member| member.jira_login == login)
            .map(|member| member.name.as_str())
            .unwrap_or(login)
    }
}

#[async_trait]
impl QueryProcessor for TimelogQuery {
    fn init(&mut self, args: &[String], now: DateTime<Utc>) -> Result<(), ArgumentError> {
        let (date, result) = match args.first() {
            None => (now, Ok(())),
            Some(token) => match parse_date_argument(token, now) {
                Ok(date) => (date, Ok(())),
                Err(e) => (now, Err(e)),
            },
        };

        self.window = Some(previous_working_day(date));
        self.state = QueryState::Initialized;
        result
    }

    fn cache_key(&self) -> String {
        self.window.map(|w| w.cache_key()).unwrap_or_default()
    }

    #[tracing::instrument(skip(self, cancel), fields(window, team = self.team.len()))]
    async fn process(&mut self, cancel: &CancellationToken) -> WardenResult<String> {
        let window = self.window.ok_or_else(not_initialized)?;
        tracing::Span::current().record("window", tracing::field::display(&window));
        self.state = QueryState::Processing;

        let logins: Vec<String> = self.team.iter().map(|m| m.jira_login.clone()).collect();
        let report = self
            .aggregator
            .users_logged_less_than(&logins, window, self.minimum, cancel)
            .await;
        self.state = QueryState::Done;
        let report = report?;

        let mut text = String::new();
        if let Some(error) = report.error() {
            let _ = writeln!(text, "{}", error.kind);
        }

        if report.below_minimum().is_empty() {
            if report.is_complete() {
                text.push_str(&render_nobody_below(self.minimum));
            }
        } else {
            text.push_str(&render_time_logs(
                report
                    .below_minimum()
                    .iter()
                    .map(|r| (self.display_name(r.user()), *r.time_spent())),
            ));
        }
        Ok(text)
    }

    fn state(&self) -> QueryState {
        self.state
    }
}

/// Builds [`TimelogQuery`] instances sharing one aggregator and team.
#[derive(Clone)]
pub struct TimelogQueryFactory {
    aggregator: TimelogAggregator,
    team: Arc<[TeamMember]>,
    minimum: Duration,
}

impl TimelogQueryFactory {
    /// Create a factory checking `team` against `minimum`.
    pub fn new(aggregator: TimelogAggregator, team: Vec<TeamMember>, minimum: Duration) -> Self {
        Self {
            aggregator,
            team: team.into(),
            minimum,
        }
    }
}

impl QueryProcessorFactory for TimelogQueryFactory {
    fn create(&self) -> Box<dyn QueryProcessor> {
        Box::new(TimelogQuery::new(
            self.aggregator.clone(),
            Arc::clone(&self.team),
            self.minimum,
        ))
    }
}
