//! Logged time per person.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Total time one person logged in a window.
///
/// A zero `time_spent` means no record was found for the person.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct TimeLogResult {
    /// Login the time was requested for
    user: String,
    /// Total logged duration
    time_spent: Duration,
}

impl TimeLogResult {
    /// Create a new result.
    pub fn new(user: impl Into<String>, time_spent: Duration) -> Self {
        Self {
            user: user.into(),
            time_spent,
        }
    }

    /// Whether anything was logged at all.
    pub fn has_record(&self) -> bool {
        !self.time_spent.is_zero()
    }
}

/// Render a duration as hours and minutes, e.g. `2h 30m` or `45m`.
pub fn format_time_spent(time_spent: Duration) -> String {
    let minutes = time_spent.as_secs() / 60;
    let (hours, minutes) = (minutes / 60, minutes % 60);
    match (hours, minutes) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}
