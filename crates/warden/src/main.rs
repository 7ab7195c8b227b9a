use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use warden::{App, Cli, ObservabilityConfig, WardenConfig, init_observability};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = WardenConfig::from_file(&cli.config)
        .map_err(|e| anyhow::anyhow!("Error in config file {}: {}", cli.config.display(), e))?;

    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.server().log_level().clone()
    };
    let observability = ObservabilityConfig::new(log_level)
        .with_json_logs(cli.json_logs || *config.server().json_logs());
    init_observability(&observability).map_err(|e| anyhow::anyhow!("{}", e))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "Starting warden"
    );

    let app = App::from_config(&config)?;
    let listener = TcpListener::bind(config.server().address()).await?;
    app.run(listener, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
