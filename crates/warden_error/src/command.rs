//! Command dispatch and authentication errors.

/// Reasons a command is rejected before any processing happens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CommandErrorKind {
    /// The command name was blank after trimming.
    #[display("empty command")]
    EmptyCommand,

    /// No processor is registered under this name.
    #[display("unknown command {:?}", _0)]
    UnknownCommand(String),

    /// The presented token does not match the processor's token.
    #[display("validation failed: invalid token")]
    InvalidToken,
}

/// Command error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Command Error: {} at line {} in {}", kind, line, file)]
pub struct CommandError {
    /// The error kind
    pub kind: CommandErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl CommandError {
    /// Create a new CommandError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CommandErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
