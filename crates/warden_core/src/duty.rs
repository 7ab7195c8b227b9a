//! On-duty periods and the rules for combining them.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::window::{TimeWindow, midnight};

/// A contiguous interval during which one person is on duty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct DutyPeriod {
    /// Person on duty
    name: String,
    /// Inclusive start
    start: DateTime<Utc>,
    /// Exclusive end
    end: DateTime<Utc>,
}

impl DutyPeriod {
    /// Create a new duty period.
    pub fn new(name: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// Whether `instant` falls in `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Sort periods by start and merge consecutive periods of the same person.
///
/// The sort is stable, so periods with equal starts keep the order they were
/// given in. Joining an already joined list is a no-op.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use warden_core::{DutyPeriod, join_periods};
///
/// let h = |hour| Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap();
/// let joined = join_periods(vec![
///     DutyPeriod::new("bob", h(9), h(12)),
///     DutyPeriod::new("ann", h(0), h(9)),
///     DutyPeriod::new("bob", h(12), h(18)),
/// ]);
/// assert_eq!(joined.len(), 2);
/// assert_eq!(*joined[1].end(), h(18));
/// ```
pub fn join_periods(mut periods: Vec<DutyPeriod>) -> Vec<DutyPeriod> {
    periods.sort_by_key(|period| period.start);

    let mut joined: Vec<DutyPeriod> = Vec::with_capacity(periods.len());
    for period in periods {
        match joined.last_mut() {
            Some(previous) if previous.name == period.name => {
                previous.end = previous.end.max(period.end);
            }
            _ => joined.push(period),
        }
    }
    joined
}

/// Periods that start today (UTC) and have not already ended.
///
/// A library view for callers listing one calendar day. It drops a shift
/// that began yesterday and is still running; the duty answer keeps that
/// shift through [`active_until`] instead.
pub fn filter_today(now: DateTime<Utc>, periods: &[DutyPeriod]) -> Vec<DutyPeriod> {
    let today = TimeWindow::day_from(midnight(now.date_naive()));
    periods
        .iter()
        .filter(|period| period.end >= now)
        .filter(|period| today.contains(period.start))
        .cloned()
        .collect()
}

/// Periods that are still running or have not started yet.
pub fn active_until(now: DateTime<Utc>, periods: &[DutyPeriod]) -> Vec<DutyPeriod> {
    periods
        .iter()
        .filter(|period| period.end > now)
        .cloned()
        .collect()
}

/// Split a sorted list into the period covering `now` and the ones after it.
///
/// When no period covers `now` the first period is reported as current and
/// the remainder as next. Returns `None` for an empty list.
pub fn split_current_and_next(
    now: DateTime<Utc>,
    periods: &[DutyPeriod],
) -> Option<(DutyPeriod, Vec<DutyPeriod>)> {
    let index = periods
        .iter()
        .position(|period| period.contains(now))
        .unwrap_or(0);
    let current = periods.get(index)?.clone();
    Some((current, periods[index + 1..].to_vec()))
}

/// Group periods per person, keeping each person's periods in input order.
pub fn group_by_name(periods: &[DutyPeriod]) -> BTreeMap<String, Vec<DutyPeriod>> {
    let mut grouped: BTreeMap<String, Vec<DutyPeriod>> = BTreeMap::new();
    for period in periods {
        grouped
            .entry(period.name.clone())
            .or_default()
            .push(period.clone());
    }
    grouped
}
