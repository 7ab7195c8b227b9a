//! Command argument errors.

/// A command argument could not be understood.
///
/// These are recovered locally: the caller falls back to a default and
/// reports the message next to the answer.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Argument Error: {} at line {} in {}", message, line, file)]
pub struct ArgumentError {
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ArgumentError {
    /// Create a new ArgumentError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_error::ArgumentError;
    ///
    /// let err = ArgumentError::new("Unknown date format: \"soon\"");
    /// assert!(err.message.contains("soon"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
