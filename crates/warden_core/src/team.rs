//! Team members known to the bot.

use serde::{Deserialize, Serialize};

/// One person with their identities in the chat and time tracking systems.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamMember {
    /// Display name, as used by the duty provider
    pub name: String,
    /// Login in the time tracking system
    pub jira_login: String,
    /// Chat handle, with or without a leading `@`
    pub slack_login: String,
}

impl TeamMember {
    /// Chat handle with a leading `@`.
    pub fn slack_handle(&self) -> String {
        if self.slack_login.starts_with('@') {
            self.slack_login.clone()
        } else {
            format!("@{}", self.slack_login)
        }
    }

    /// First word of the display name.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}
