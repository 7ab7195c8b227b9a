//! Slash command handling.
//!
//! # Architecture
//!
//! - [`CommandProcessManager`] - registry of command processors, token check and dispatch
//! - [`PostponedCommandProcessor`] - answers from cache or acknowledges and computes in the background
//! - [`QueryProcessor`] - per-invocation state machine turning arguments into an answer
//! - [`DutyQuery`] / [`TimelogQuery`] - the two concrete queries
//!
//! A request flows manager → postponed processor → query processor →
//! aggregator, and the rendered answer is written to the cache and pushed
//! to the chat through [`warden_interface::Messenger`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod duty;
mod manager;
mod postponed;
mod query;
mod slash;
mod timelog;

pub use duty::{DutyQuery, DutyQueryFactory};
pub use manager::{CommandProcessManager, CommandProcessor};
pub use postponed::{DEFAULT_PROCESS_TIMEOUT, PostponedCommandProcessor};
pub use query::{QueryProcessor, QueryProcessorFactory, QueryState};
pub use slash::{CommandResult, SlashCommand};
pub use timelog::{TimelogQuery, TimelogQueryFactory};
