//! "Who is on duty" query.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use warden_aggregate::DutyAggregator;
use warden_core::{TimeWindow, active_until, parse_date_argument, render_on_duty, split_current_and_next};
use warden_error::{ArgumentError, WardenResult};

use crate::query::{QueryProcessor, QueryProcessorFactory, QueryState, not_initialized};

/// Reports the person on duty at the window start and the ones after them.
///
/// Without arguments the window is `[now, now + 24h)`. A date argument moves
/// the window start to that date.
pub struct DutyQuery {
    aggregator: DutyAggregator,
    schedule_ids: Arc<[String]>,
    window: Option<TimeWindow>,
    state: QueryState,
}

impl DutyQuery {
    /// Create a query over `schedule_ids`.
    pub fn new(aggregator: DutyAggregator, schedule_ids: Arc<[String]>) -> Self {
        Self {
            aggregator,
            schedule_ids,
            window: None,
            state: QueryState::Created,
        }
    }

    /// Resolved window, once initialized.
    pub fn window(&self) -> Option<TimeWindow> {
        self.window
    }
}

#[async_trait]
impl QueryProcessor for DutyQuery {
    fn init(&mut self, args: &[String], now: DateTime<Utc>) -> Result<(), ArgumentError> {
        let (from, result) = match args.first() {
            None => (now, Ok(())),
            Some(token) => match parse_date_argument(token, now) {
                Ok(from) => (from, Ok(())),
                Err(e) => (now, Err(e)),
            },
        };

        self.window = Some(TimeWindow::starting_at(from, Duration::hours(24)));
        self.state = QueryState::Initialized;
        result
    }

    fn cache_key(&self) -> String {
        self.window.map(|w| w.cache_key()).unwrap_or_default()
    }

    #[tracing::instrument(skip(self, cancel), fields(window))]
    async fn process(&mut self, cancel: &CancellationToken) -> WardenResult<String> {
        let window = self.window.ok_or_else(not_initialized)?;
        tracing::Span::current().record("window", tracing::field::display(&window));
        self.state = QueryState::Processing;

        let periods = self
            .aggregator
            .users_on_duty(window, &self.schedule_ids, cancel)
            .await;
        self.state = QueryState::Done;

        // The period running at the window start may have begun before it.
        let upcoming: Vec<_> = active_until(window.from, &periods?)
            .into_iter()
            .filter(|period| *period.start() < window.to)
            .collect();

        let text = match split_current_and_next(window.from, &upcoming) {
            Some((current, next)) => render_on_duty(Some(&current), &next),
            None => render_on_duty(None, &[]),
        };
        Ok(text)
    }

    fn state(&self) -> QueryState {
        self.state
    }
}

/// Builds [`DutyQuery`] instances sharing one aggregator.
#[derive(Clone)]
pub struct DutyQueryFactory {
    aggregator: DutyAggregator,
    schedule_ids: Arc<[String]>,
}

impl DutyQueryFactory {
    /// Create a factory for queries over `schedule_ids`.
    pub fn new(aggregator: DutyAggregator, schedule_ids: Vec<String>) -> Self {
        Self {
            aggregator,
            schedule_ids: schedule_ids.into(),
        }
    }
}

impl QueryProcessorFactory for DutyQueryFactory {
    fn create(&self) -> Box<dyn QueryProcessor> {
        Box::new(DutyQuery::new(
            self.aggregator.clone(),
            Arc::clone(&self.schedule_ids),
        ))
    }
}
