//! Errors raised by upstream provider clients (duty schedules, timesheets, chat).

/// Specific upstream failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProviderErrorKind {
    /// Transport-level failure (connect, TLS, body read).
    #[display("HTTP request failed: {}", _0)]
    Http(String),

    /// Upstream answered with a non-success status.
    #[display("Unexpected status {}: {}", status, body)]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// Response body could not be decoded.
    #[display("Failed to decode response: {}", _0)]
    Decode(String),

    /// The request could not be built from the given parameters.
    #[display("Invalid request: {}", _0)]
    InvalidRequest(String),

    /// A worklog entry belongs to somebody else.
    #[display("worklog author {:?} != user {:?}", author, user)]
    AuthorMismatch {
        /// Author reported by the timesheet
        author: String,
        /// User the timesheet was requested for
        user: String,
    },
}

/// Provider error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", kind, line, file)]
pub struct ProviderError {
    /// The error kind
    pub kind: ProviderErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether a retry has a chance to succeed.
    pub fn is_transient(&self) -> bool {
        match &self.kind {
            ProviderErrorKind::Http(_) => true,
            ProviderErrorKind::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
