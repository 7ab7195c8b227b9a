//! Warden on-call chat bot.
//!
//! Wires the command pipeline, the daily digests and the HTTP endpoint
//! together from a TOML configuration file.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod cli;
mod config;
mod observability;
mod server;

pub use app::App;
pub use cli::Cli;
pub use config::{
    DutyCommandConfig, DutyProviderKind, JiraConfig, OpsgenieConfig, PagerdutyConfig, ServerConfig,
    SlackConfig, TimelogsCommandConfig, WardenConfig,
};
pub use observability::{ObservabilityConfig, init_observability};
pub use server::{ApiState, create_router};
