//! Command line arguments.

use clap::Parser;
use std::path::PathBuf;

/// On-call chat bot answering slash commands and posting daily digests.
#[derive(Parser, Debug)]
#[command(name = "warden", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "WARDEN_CONFIG", default_value = "warden.toml")]
    pub config: PathBuf,

    /// Log at debug level regardless of the configured level
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON formatted logs
    #[arg(long)]
    pub json_logs: bool,
}
