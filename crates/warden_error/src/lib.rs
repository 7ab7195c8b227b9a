//! Error types for the warden workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! The user-facing text of an error is its [`WardenError::message`], which
//! omits the location so it can be rendered into a chat reply.
//!
//! # Examples
//!
//! ```
//! use warden_error::{ArgumentError, WardenResult};
//!
//! fn parse(token: &str) -> WardenResult<u32> {
//!     Err(ArgumentError::new(format!("Unknown date format: {:?}", token)))?
//! }
//!
//! let err = parse("someday").unwrap_err();
//! assert_eq!(err.message(), "Unknown date format: \"someday\"");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aggregate;
mod argument;
mod command;
mod config;
mod error;
mod provider;

pub use aggregate::{AggregateError, AggregateErrorKind};
pub use argument::ArgumentError;
pub use command::{CommandError, CommandErrorKind};
pub use config::ConfigError;
pub use error::{WardenError, WardenErrorKind, WardenResult};
pub use provider::{ProviderError, ProviderErrorKind};
