//! Query processor contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use warden_error::{ArgumentError, WardenResult};

/// Where a query processor is in its single use lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum QueryState {
    /// Constructed, window not resolved yet
    #[display("created")]
    Created,
    /// Window resolved, cache key available
    #[display("initialized")]
    Initialized,
    /// Upstream work in flight
    #[display("processing")]
    Processing,
    /// Answer produced
    #[display("done")]
    Done,
}

/// Turns command arguments into a rendered answer.
///
/// A fresh instance handles exactly one invocation:
/// `init` → `cache_key` → `process`.
///
/// # Example Implementation
///
/// ```rust,ignore
/// #[async_trait]
/// impl QueryProcessor for EchoQuery {
///     fn init(&mut self, args: &[String], _now: DateTime<Utc>) -> Result<(), ArgumentError> {
///         self.text = args.join(" ");
///         Ok(())
///     }
///
///     fn cache_key(&self) -> String {
///         self.text.clone()
///     }
///
///     async fn process(&mut self, _cancel: &CancellationToken) -> WardenResult<String> {
///         Ok(self.text.clone())
///     }
///
///     fn state(&self) -> QueryState {
///         QueryState::Done
///     }
/// }
/// ```
#[async_trait]
pub trait QueryProcessor: Send {
    /// Resolve the query window from `args`.
    ///
    /// On a parse error the default window is used and the error is still
    /// returned so the caller can report it. The processor is usable either way.
    fn init(&mut self, args: &[String], now: DateTime<Utc>) -> Result<(), ArgumentError>;

    /// Key identifying the resolved window.
    ///
    /// Depends on the window only, so different arguments resolving to the
    /// same window share a key.
    fn cache_key(&self) -> String;

    /// Fetch upstream data and render the answer.
    async fn process(&mut self, cancel: &CancellationToken) -> WardenResult<String>;

    /// Current lifecycle state.
    fn state(&self) -> QueryState;
}

/// Creates a fresh [`QueryProcessor`] per invocation.
pub trait QueryProcessorFactory: Send + Sync {
    /// New processor in the [`QueryState::Created`] state.
    fn create(&self) -> Box<dyn QueryProcessor>;
}

/// Error returned when `process` runs before `init`.
#[track_caller]
pub(crate) fn not_initialized() -> ArgumentError {
    ArgumentError::new("query processed before init")
}
