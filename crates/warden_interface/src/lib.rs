//! Boundary traits between the warden core and the outside world.
//!
//! - [`DutyProvider`] - one on-call schedule lookup per call
//! - [`TimelogProvider`] - one user's logged time per call
//! - [`Messenger`] - outbound chat delivery
//!
//! Each provider call covers exactly one upstream unit of work; the
//! aggregators in `warden_aggregate` fan a query out over many of them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{DutyProvider, Messenger, TimelogProvider};
