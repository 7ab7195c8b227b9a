//! Daily digests pushed to the team channel.
//!
//! - [`DutyDigest`]: who is on duty now and next, plus a personal heads-up
//!   for everyone with an upcoming duty
//! - [`TimelogDigest`]: who under-logged time on the previous working day,
//!   plus a personal reminder for each of them
//! - [`DailyScheduler`]: runs [`DailyJob`]s once a day at a fixed time

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod duty_digest;
mod job;
mod scheduler;
mod timelog_digest;

pub use duty_digest::{DUTY_DIGEST_HORIZON_HOURS, DutyDigest, render_duty_notice};
pub use job::DailyJob;
pub use scheduler::{DEFAULT_TICK, DailyScheduler};
pub use timelog_digest::{TimelogDigest, render_timelog_reminder};
