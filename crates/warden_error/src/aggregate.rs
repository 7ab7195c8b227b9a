//! Errors produced while fanning a query out to several upstream units.

use std::time::Duration;

/// Aggregation failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum AggregateErrorKind {
    /// A single unit (schedule or user) failed.
    #[display("{}: {}", target, message)]
    Unit {
        /// Schedule ID or user the unit worked on
        target: String,
        /// Rendered cause
        message: String,
    },

    /// Several units failed; messages are kept in dispatch order.
    #[display("Multiple errors occurred: {}", _0.join(", "))]
    Multiple(Vec<String>),

    /// The caller cancelled the aggregation.
    #[display("aggregation cancelled")]
    Cancelled,

    /// A deadline elapsed before all units reported.
    #[display("timed out after {:?}", _0)]
    TimedOut(Duration),

    /// A unit task panicked or was aborted.
    #[display("unit task failed: {}", _0)]
    Join(String),
}

/// Aggregation error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Aggregate Error: {} at line {} in {}", kind, line, file)]
pub struct AggregateError {
    /// The error kind
    pub kind: AggregateErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl AggregateError {
    /// Create a new AggregateError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AggregateErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
