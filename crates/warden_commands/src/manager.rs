//! Command registry with per-command authentication.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use warden_error::{CommandError, CommandErrorKind, WardenResult};

use crate::{CommandResult, SlashCommand};

/// Handles one slash command name.
#[async_trait]
pub trait CommandProcessor: Send + Sync {
    /// Token callers must present.
    fn auth_token(&self) -> &str;

    /// Answer `command` with already tokenized `args`.
    ///
    /// Must return promptly: expensive work belongs in the background.
    fn process_command(
        &self,
        command: &SlashCommand,
        now: DateTime<Utc>,
        args: &[String],
    ) -> CommandResult;

    /// Stop background work and wait for it.
    async fn shutdown(&self) {}
}

/// Registry mapping command names to processors.
///
/// Registration and dispatch may happen concurrently. Registering a name
/// that is already taken replaces the previous processor.
///
/// # Example
///
/// ```rust,ignore
/// let manager = CommandProcessManager::new();
/// manager.add_command_processor("duty", Arc::new(duty_processor));
///
/// let result = manager.process_command(&slash_command)?;
/// ```
#[derive(Default)]
pub struct CommandProcessManager {
    processors: RwLock<HashMap<String, Arc<dyn CommandProcessor>>>,
}

impl CommandProcessManager {
    /// Create an empty registry.
    pub fn new() -> Self {
        tracing::debug!("Creating new CommandProcessManager");
        Self::default()
    }

    /// Register `processor` for `name`, returning the processor it replaced.
    pub fn add_command_processor(
        &self,
        name: impl Into<String>,
        processor: Arc<dyn CommandProcessor>,
    ) -> Option<Arc<dyn CommandProcessor>> {
        let name = name.into();
        let replaced = self.processors.write().insert(name.clone(), processor);
        if replaced.is_some() {
            tracing::warn!(command = %name, "Replacing registered command processor");
        } else {
            tracing::info!(command = %name, "Registered command processor");
        }
        replaced
    }

    /// Registered command names, sorted.
    pub fn commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self.processors.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Authenticate and dispatch `command` at the current time.
    pub fn process_command(&self, command: &SlashCommand) -> WardenResult<CommandResult> {
        self.process_command_at(command, Utc::now())
    }

    /// Authenticate and dispatch `command` as if received at `now`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The command name is blank
    /// - No processor is registered for it
    /// - The token does not match the processor's token
    #[tracing::instrument(skip(self, command, now), fields(command = %command.command, user = %command.user_name))]
    pub fn process_command_at(
        &self,
        command: &SlashCommand,
        now: DateTime<Utc>,
    ) -> WardenResult<CommandResult> {
        let name = command.name();
        if name.is_empty() {
            return Err(CommandError::new(CommandErrorKind::EmptyCommand).into());
        }

        let processor = self
            .processors
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| CommandError::new(CommandErrorKind::UnknownCommand(name.to_string())))?;

        if !tokens_match(command.token.as_bytes(), processor.auth_token().as_bytes()) {
            tracing::warn!(command = %name, "Rejected command with invalid token");
            return Err(CommandError::new(CommandErrorKind::InvalidToken).into());
        }

        let args = command.args();
        tracing::info!(command = %name, args = ?args, "Dispatching command");
        Ok(processor.process_command(command, now, &args))
    }

    /// Shut down every registered processor.
    pub async fn shutdown(&self) {
        let processors: Vec<Arc<dyn CommandProcessor>> =
            self.processors.read().values().cloned().collect();
        for processor in processors {
            processor.shutdown().await;
        }
    }
}

/// Equality whose duration does not depend on where the inputs differ.
fn tokens_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
