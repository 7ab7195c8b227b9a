//! Provider and messenger traits.

use async_trait::async_trait;
use std::time::Duration;
use warden_core::{DutyPeriod, TimeWindow};
use warden_error::ProviderError;

/// Source of on-call schedules.
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct StaticSchedule(Vec<DutyPeriod>);
///
/// #[async_trait]
/// impl DutyProvider for StaticSchedule {
///     async fn duty_periods(&self, _schedule_id: &str, _window: TimeWindow)
///         -> Result<Vec<DutyPeriod>, ProviderError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait DutyProvider: Send + Sync {
    /// On-duty periods of one schedule overlapping `window`.
    ///
    /// # Errors
    ///
    /// Returns error on transport or decode failure.
    async fn duty_periods(
        &self,
        schedule_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<DutyPeriod>, ProviderError>;
}

/// Source of logged working time.
#[async_trait]
pub trait TimelogProvider: Send + Sync {
    /// Total time `user` logged within `window`.
    ///
    /// A zero duration is ambiguous: the user may not have logged anything
    /// or the upstream may not have settled yet.
    ///
    /// # Errors
    ///
    /// Returns error on transport or decode failure.
    async fn time_spent(&self, user: &str, window: TimeWindow) -> Result<Duration, ProviderError>;
}

/// Outbound chat delivery.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Post `text` to a channel or a user handle.
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), ProviderError>;

    /// Deliver the late answer of a slash command to its response URL.
    async fn send_postponed_message(
        &self,
        response_url: &str,
        text: &str,
    ) -> Result<(), ProviderError>;
}
