//! Daily job contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use warden_error::WardenResult;

/// Work executed once a day by the [`crate::DailyScheduler`].
#[async_trait]
pub trait DailyJob: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Run the job as of `now`.
    ///
    /// Failures are logged by the scheduler; the job runs again the next day.
    async fn run(&self, now: DateTime<Utc>) -> WardenResult<()>;
}
