//! Core data types for the warden on-call chat bot.
//!
//! This crate holds the domain values shared by every other crate (duty
//! periods, time log results, team members) together with the pure rules
//! that operate on them: argument/date resolution, working-day windows and
//! the duty period join rule, plus the plain text rendering of answers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod daytime;
mod duty;
mod render;
mod team;
mod timelog;
mod window;

pub use daytime::DayTime;
pub use duty::{
    DutyPeriod, active_until, filter_today, group_by_name, join_periods, split_current_and_next,
};
pub use render::{
    RageCounter, TIME_FORMAT, render_nobody_below, render_on_duty, render_time_logs,
};
pub use team::TeamMember;
pub use timelog::{TimeLogResult, format_time_spent};
pub use window::{
    DATE_FORMAT, TimeWindow, midnight, parse_date_argument, previous_working_day,
};
