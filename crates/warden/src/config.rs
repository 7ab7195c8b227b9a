//! TOML configuration.
//!
//! ```toml
//! [server]
//! port = 8080
//!
//! [slack]
//! token = "xoxb-..."
//! channel = "#ops"
//!
//! [jira]
//! token = "..."
//! base_url = "https://jira.example.com"
//!
//! [opsgenie]
//! token = "..."
//!
//! [pagerduty]
//! token = "..."
//! subdomain = "acme"
//! time_zone = "Europe/Moscow"
//!
//! [duty_command]
//! enable = true
//! provider = "opsgenie"
//! name = "duty"
//! token = "..."
//! schedule_ids = ["primary"]
//! daily_message_time = "09:00"
//! ```
//!
//! Secrets may be left out of the file and supplied through
//! `WARDEN_SLACK_TOKEN`, `WARDEN_JIRA_TOKEN`, `WARDEN_OPSGENIE_TOKEN` and
//! `WARDEN_PAGERDUTY_TOKEN`.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use warden_aggregate::RetryPolicy;
use warden_core::{DayTime, TeamMember};
use warden_error::{ConfigError, WardenResult};
use warden_providers::{
    OPSGENIE_BASE_URL, PAGERDUTY_DEFAULT_TIME_ZONE, SLACK_API_URL, pagerduty_base_url,
};

/// Environment variable overriding `slack.token`.
const SLACK_TOKEN_ENV: &str = "WARDEN_SLACK_TOKEN";
/// Environment variable overriding `jira.token`.
const JIRA_TOKEN_ENV: &str = "WARDEN_JIRA_TOKEN";
/// Environment variable overriding `opsgenie.token`.
const OPSGENIE_TOKEN_ENV: &str = "WARDEN_OPSGENIE_TOKEN";
/// Environment variable overriding `pagerduty.token`.
const PAGERDUTY_TOKEN_ENV: &str = "WARDEN_PAGERDUTY_TOKEN";

/// Whole bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct WardenConfig {
    /// HTTP listener and logging
    #[serde(default)]
    server: ServerConfig,
    /// Chat delivery
    slack: SlackConfig,
    /// Time tracking
    #[serde(default)]
    jira: JiraConfig,
    /// On-call schedules
    #[serde(default)]
    opsgenie: OpsgenieConfig,
    /// On-call schedules, PagerDuty flavour
    #[serde(default)]
    pagerduty: PagerdutyConfig,
    /// Upstream call bounds
    #[serde(default)]
    retry: RetryPolicy,
    /// `/duty` command and digest
    #[serde(default)]
    duty_command: DutyCommandConfig,
    /// `/timelogs` command and digest
    #[serde(default)]
    timelogs_command: TimelogsCommandConfig,
}

impl WardenConfig {
    /// Load, apply environment overrides and validate.
    pub fn from_file(path: impl AsRef<Path>) -> WardenResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::new(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let mut config = Self::parse(&content)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML text without validating it.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Replace secrets with values found through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let overrides = [
            (SLACK_TOKEN_ENV, &mut self.slack.token),
            (JIRA_TOKEN_ENV, &mut self.jira.token),
            (OPSGENIE_TOKEN_ENV, &mut self.opsgenie.token),
            (PAGERDUTY_TOKEN_ENV, &mut self.pagerduty.token),
        ];
        for (key, slot) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                tracing::debug!(key, "Secret taken from environment");
                *slot = value;
            }
        }
    }

    /// Check every enabled part is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        require(&self.slack.token, "slack token must be non empty")?;
        require(&self.slack.channel, "slack channel must be non empty")?;

        if self.duty_command.enable {
            match self.duty_command.provider {
                DutyProviderKind::Opsgenie => {
                    require(&self.opsgenie.token, "opsgenie token must be non empty")?;
                }
                DutyProviderKind::Pagerduty => self.pagerduty.validate()?,
            }
            self.duty_command.validate()?;
        }
        if self.timelogs_command.enable {
            require(&self.jira.token, "jira token must be non empty")?;
            require(&self.jira.base_url, "jira base url must be non empty")?;
            self.timelogs_command.validate()?;
        }
        if *self.retry.max_attempts() == 0 {
            return Err(ConfigError::new("retry max_attempts must be positive"));
        }
        Ok(())
    }
}

fn require(value: &str, message: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::new(message));
    }
    Ok(())
}

fn parse_day_time(value: &str, command: &str) -> Result<DayTime, ConfigError> {
    value.parse().map_err(|e: ConfigError| {
        ConfigError::new(format!(
            "error parse {} daily message time: {}",
            command, e.message
        ))
    })
}

/// HTTP listener and logging.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    host: String,
    /// Port to bind, below 60000
    #[serde(default = "default_port")]
    port: u16,
    /// Deadline for one postponed computation
    #[serde(default = "default_process_timeout_secs")]
    process_timeout_secs: u64,
    /// Default log filter
    #[serde(default = "default_log_level")]
    log_level: String,
    /// Emit JSON logs
    #[serde(default)]
    json_logs: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_process_timeout_secs() -> u64 {
    25
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            process_timeout_secs: default_process_timeout_secs(),
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

impl ServerConfig {
    /// `host:port` to bind.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Deadline for one postponed computation.
    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.process_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 || self.port >= 60000 {
            return Err(ConfigError::new(
                "port value must be positive and less than 60000",
            ));
        }
        if self.process_timeout_secs == 0 {
            return Err(ConfigError::new("process timeout must be positive"));
        }
        Ok(())
    }
}

/// Chat delivery.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct SlackConfig {
    /// Bot token
    #[serde(default)]
    token: String,
    /// Channel receiving the daily digests
    #[serde(default)]
    channel: String,
    /// Web API base URL
    #[serde(default = "default_slack_api_url")]
    api_url: String,
}

fn default_slack_api_url() -> String {
    SLACK_API_URL.to_string()
}

/// Time tracking.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Getters)]
pub struct JiraConfig {
    /// Basic auth credential, already encoded
    #[serde(default)]
    token: String,
    /// Instance base URL
    #[serde(default)]
    base_url: String,
}

/// On-call schedules.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct OpsgenieConfig {
    /// API key
    #[serde(default)]
    token: String,
    /// API base URL
    #[serde(default = "default_opsgenie_base_url")]
    base_url: String,
}

fn default_opsgenie_base_url() -> String {
    OPSGENIE_BASE_URL.to_string()
}

impl Default for OpsgenieConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: default_opsgenie_base_url(),
        }
    }
}

/// On-call schedules hosted by PagerDuty.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct PagerdutyConfig {
    /// API token
    #[serde(default)]
    token: String,
    /// Account subdomain
    #[serde(default)]
    subdomain: String,
    /// Overrides the URL derived from `subdomain`
    #[serde(default)]
    base_url: String,
    /// Zone the schedule entries are rendered in
    #[serde(default = "default_pagerduty_time_zone")]
    time_zone: String,
}

fn default_pagerduty_time_zone() -> String {
    PAGERDUTY_DEFAULT_TIME_ZONE.to_string()
}

impl Default for PagerdutyConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            subdomain: String::new(),
            base_url: String::new(),
            time_zone: default_pagerduty_time_zone(),
        }
    }
}

impl PagerdutyConfig {
    /// URL requests are sent to.
    pub fn api_url(&self) -> String {
        if self.base_url.trim().is_empty() {
            pagerduty_base_url(&self.subdomain)
        } else {
            self.base_url.clone()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require(&self.token, "pagerduty token must be non empty")?;
        if self.subdomain.trim().is_empty() && self.base_url.trim().is_empty() {
            return Err(ConfigError::new(
                "pagerduty subdomain or base url must be non empty",
            ));
        }
        require(&self.time_zone, "pagerduty time zone must be non empty")
    }
}

/// Service answering the duty command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DutyProviderKind {
    /// [`OpsgenieConfig`]
    #[default]
    Opsgenie,
    /// [`PagerdutyConfig`]
    Pagerduty,
}

fn default_cache_ttl_secs() -> u64 {
    60
}

/// `/duty` command and its daily digest.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct DutyCommandConfig {
    /// Register the command and schedule the digest
    #[serde(default)]
    enable: bool,
    /// Service the schedules live in
    #[serde(default)]
    provider: DutyProviderKind,
    /// Command name, without `/`
    #[serde(default = "default_duty_name")]
    name: String,
    /// Shared secret the chat platform sends
    #[serde(default)]
    token: String,
    /// Schedules merged into one roster
    #[serde(default)]
    schedule_ids: Vec<String>,
    /// How long answers stay cached
    #[serde(default = "default_cache_ttl_secs")]
    cache_ttl_secs: u64,
    /// Digest time of day (`HH:MM`, UTC)
    #[serde(default)]
    daily_message_time: String,
}

fn default_duty_name() -> String {
    "duty".to_string()
}

impl Default for DutyCommandConfig {
    fn default() -> Self {
        Self {
            enable: false,
            provider: DutyProviderKind::default(),
            name: default_duty_name(),
            token: String::new(),
            schedule_ids: Vec::new(),
            cache_ttl_secs: default_cache_ttl_secs(),
            daily_message_time: String::new(),
        }
    }
}

impl DutyCommandConfig {
    /// How long answers stay cached.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Parsed digest time.
    pub fn daily_time(&self) -> Result<DayTime, ConfigError> {
        parse_day_time(&self.daily_message_time, "duty")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require(&self.name, "empty duty command name")?;
        require(&self.token, "duty command token must be non empty")?;
        if self.schedule_ids.iter().all(|id| id.trim().is_empty()) {
            return Err(ConfigError::new(
                "duty command schedule ids must be non empty",
            ));
        }
        self.daily_time()?;
        Ok(())
    }
}

/// `/timelogs` command and its daily digest.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct TimelogsCommandConfig {
    /// Register the command and schedule the digest
    #[serde(default)]
    enable: bool,
    /// Command name, without `/`
    #[serde(default = "default_timelogs_name")]
    name: String,
    /// Shared secret the chat platform sends
    #[serde(default)]
    token: String,
    /// People whose time is checked
    #[serde(default)]
    team: Vec<TeamMember>,
    /// Threshold below which someone is reported
    #[serde(default)]
    minimum_time_logged_mins: u64,
    /// How long answers stay cached
    #[serde(default = "default_cache_ttl_secs")]
    cache_ttl_secs: u64,
    /// Digest time of day (`HH:MM`, UTC)
    #[serde(default)]
    daily_message_time: String,
}

fn default_timelogs_name() -> String {
    "timelogs".to_string()
}

impl Default for TimelogsCommandConfig {
    fn default() -> Self {
        Self {
            enable: false,
            name: default_timelogs_name(),
            token: String::new(),
            team: Vec::new(),
            minimum_time_logged_mins: 0,
            cache_ttl_secs: default_cache_ttl_secs(),
            daily_message_time: String::new(),
        }
    }
}

impl TimelogsCommandConfig {
    /// How long answers stay cached.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Threshold below which someone is reported.
    pub fn minimum_time_logged(&self) -> Duration {
        Duration::from_secs(self.minimum_time_logged_mins * 60)
    }

    /// Parsed digest time.
    pub fn daily_time(&self) -> Result<DayTime, ConfigError> {
        parse_day_time(&self.daily_message_time, "timelogs")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require(&self.name, "empty time logs command name")?;
        require(&self.token, "timelogs command auth token must be non empty")?;
        if self.minimum_time_logged_mins == 0 {
            return Err(ConfigError::new(
                "timelogs command minimum time logged must be positive",
            ));
        }
        if self.team.is_empty() {
            return Err(ConfigError::new("timelogs command team must be non empty"));
        }
        self.daily_time()?;
        Ok(())
    }
}
