//! Top-level error wrapper types.

use crate::{AggregateError, ArgumentError, CommandError, ConfigError, ProviderError};

/// Every error condition the workspace can surface.
///
/// # Examples
///
/// ```
/// use warden_error::{CommandError, CommandErrorKind, WardenError};
///
/// let err: WardenError = CommandError::new(CommandErrorKind::EmptyCommand).into();
/// assert!(format!("{}", err).contains("empty command"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum WardenErrorKind {
    /// Bad command argument
    #[from(ArgumentError)]
    Argument(ArgumentError),
    /// Upstream provider failure
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Fan-out/fan-in failure
    #[from(AggregateError)]
    Aggregate(AggregateError),
    /// Dispatch or authentication failure
    #[from(CommandError)]
    Command(CommandError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Warden error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Warden Error: {}", _0)]
pub struct WardenError(Box<WardenErrorKind>);

impl WardenError {
    /// Create a new error from a kind.
    pub fn new(kind: WardenErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &WardenErrorKind {
        &self.0
    }

    /// Human readable message without source location, suitable for chat replies.
    pub fn message(&self) -> String {
        match self.kind() {
            WardenErrorKind::Argument(e) => e.message.clone(),
            WardenErrorKind::Provider(e) => e.kind.to_string(),
            WardenErrorKind::Aggregate(e) => e.kind.to_string(),
            WardenErrorKind::Command(e) => e.kind.to_string(),
            WardenErrorKind::Config(e) => e.message.clone(),
        }
    }
}

impl Clone for WardenError {
    fn clone(&self) -> Self {
        let kind = match self.kind() {
            WardenErrorKind::Argument(e) => WardenErrorKind::Argument(e.clone()),
            WardenErrorKind::Provider(e) => WardenErrorKind::Provider(e.clone()),
            WardenErrorKind::Aggregate(e) => WardenErrorKind::Aggregate(e.clone()),
            WardenErrorKind::Command(e) => WardenErrorKind::Command(e.clone()),
            WardenErrorKind::Config(e) => WardenErrorKind::Config(e.clone()),
        };
        Self::new(kind)
    }
}

// Generic From implementation for any type that converts to WardenErrorKind
impl<T> From<T> for WardenError
where
    T: Into<WardenErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for warden operations.
pub type WardenResult<T> = std::result::Result<T, WardenError>;
