//! Inbound slash command payload and the immediate reply.

use serde::{Deserialize, Serialize};

/// Fields the chat platform posts for a slash command.
///
/// Every field defaults to empty so a partially filled form still parses;
/// validation happens in the manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlashCommand {
    /// Channel the command was typed in
    pub channel_id: String,
    /// Channel name
    pub channel_name: String,
    /// Invoking user
    pub user_id: String,
    /// Invoking user name
    pub user_name: String,
    /// Command name, usually with a leading `/`
    pub command: String,
    /// Workspace ID
    pub team_id: String,
    /// Workspace domain
    pub team_domain: String,
    /// Free text after the command name
    pub text: String,
    /// Shared secret configured for the command
    pub token: String,
    /// Where a postponed answer is delivered
    pub response_url: String,
}

impl SlashCommand {
    /// Command name without surrounding slashes and spaces.
    pub fn name(&self) -> &str {
        self.command.trim_matches(|c| c == '/' || c == ' ')
    }

    /// Whitespace separated arguments.
    pub fn args(&self) -> Vec<String> {
        self.text
            .trim_matches(|c| c == '/' || c == ' ')
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// Immediate reply to a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Text to show right away; empty when postponed
    pub text: String,
    /// The answer will arrive later through the response URL
    pub postponed: bool,
}

impl CommandResult {
    /// Answer available now.
    pub fn immediate(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            postponed: false,
        }
    }

    /// Answer delivered later.
    pub fn postponed() -> Self {
        Self {
            text: String::new(),
            postponed: true,
        }
    }
}
