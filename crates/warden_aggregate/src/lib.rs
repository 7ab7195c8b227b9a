//! Provider aggregators.
//!
//! An aggregator fans one logical query out to several upstream units (one
//! per duty schedule, one per user) running concurrently in a
//! [`tokio::task::JoinSet`], waits for every unit to report, and fans the
//! outcomes back in:
//!
//! - [`DutyAggregator`] is all-or-nothing. One failing schedule fails the
//!   whole aggregation.
//! - [`TimelogAggregator`] is best effort. Every per-user failure is
//!   reported next to the partial result computed from the other users.
//!
//! Both observe a caller supplied [`tokio_util::sync::CancellationToken`] and
//! bound every upstream call with a timeout.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod duty;
mod fanout;
mod policy;
mod timelog;

pub use duty::DutyAggregator;
pub use policy::{RetryPolicy, RetryPolicyBuilder};
pub use timelog::{TimelogAggregator, TimelogReport};
