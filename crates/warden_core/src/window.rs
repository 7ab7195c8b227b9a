//! Time windows resolved from command arguments.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use warden_error::ArgumentError;

/// Date format accepted in command arguments and used in cache keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Distance every resolved argument keeps from the representable range, so
/// windows built around it stay representable.
const RANGE_MARGIN_DAYS: i64 = 7;

/// Half-open interval `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("[{}, {})", from, to)]
pub struct TimeWindow {
    /// Inclusive start
    pub from: DateTime<Utc>,
    /// Exclusive end
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    /// Window starting at `from` lasting `length`.
    ///
    /// The end saturates at the representable range.
    pub fn starting_at(from: DateTime<Utc>, length: Duration) -> Self {
        let to = from.checked_add_signed(length).unwrap_or(if length < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });
        Self { from, to }
    }

    /// `[from, from + 24h)`.
    pub fn day_from(from: DateTime<Utc>) -> Self {
        Self::starting_at(from, Duration::hours(24))
    }

    /// Whether `instant` lies inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }

    /// Window length.
    pub fn length(&self) -> Duration {
        self.to - self.from
    }

    /// Cache key for this window.
    ///
    /// Day granular and zero padded, so `today` and today's explicit date
    /// produce the same key while distinct days never collide.
    pub fn cache_key(&self) -> String {
        format!(
            "{}_{}",
            self.from.format(DATE_FORMAT),
            self.to.format(DATE_FORMAT)
        )
    }
}

/// 00:00 UTC of `date`.
pub fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

/// Resolve a single date argument relative to `now`.
///
/// Recognised tokens are `now`, `today`, `yesterday`, `tomorrow` and an
/// explicit `YYYY-MM-DD` date (resolved to midnight UTC).
///
/// # Errors
///
/// Returns [`ArgumentError`] for any other token, and for dates too close to
/// the representable range to build a window around; callers fall back to
/// their default window and report the message.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use warden_core::parse_date_argument;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 14, 10, 30, 0).unwrap();
/// assert_eq!(parse_date_argument("today", now).unwrap(), now);
/// assert!(parse_date_argument("someday", now).is_err());
/// ```
pub fn parse_date_argument(token: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ArgumentError> {
    let resolved = match token {
        "now" | "today" => Some(now),
        "yesterday" => now.checked_sub_signed(Duration::hours(24)),
        "tomorrow" => now.checked_add_signed(Duration::hours(24)),
        _ => Some(
            NaiveDate::parse_from_str(token, DATE_FORMAT)
                .map(midnight)
                .map_err(|_| ArgumentError::new(format!("Unknown date format: {:?}", token)))?,
        ),
    };

    resolved
        .filter(|instant| within_range(*instant))
        .ok_or_else(|| ArgumentError::new(format!("Date out of range: {:?}", token)))
}

fn within_range(instant: DateTime<Utc>) -> bool {
    let margin = Duration::days(RANGE_MARGIN_DAYS);
    instant.checked_sub_signed(margin).is_some() && instant.checked_add_signed(margin).is_some()
}

/// The last completed working day before `date`.
///
/// Monday rolls back to the preceding Friday, Sunday rolls back two days,
/// every other day rolls back one day.
pub fn previous_working_day(date: DateTime<Utc>) -> TimeWindow {
    let day_start = midnight(date.date_naive());
    let back = match date.weekday() {
        Weekday::Mon => 3,
        Weekday::Sun => 2,
        _ => 1,
    };
    let from = day_start
        .checked_sub_signed(Duration::days(back))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    TimeWindow::day_from(from)
}
