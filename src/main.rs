//! Main entry point for the ballchasing-downloader CLI

use ballchasing_downloader::cli::{Cli, CliError, Commands};
use ballchasing_downloader::metrics;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ballchasing_downloader=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr {
        if let Err(e) = metrics::init_metrics(addr) {
            error!("Metrics exporter unavailable: {}", e);
        }
    }

    let result = match cli.command {
        Commands::Validate(ref cmd) => cmd.execute(&cli).await.map_err(|e| anyhow::anyhow!(e)),
        Commands::List(ref cmd) => cmd.execute(&cli).await.map_err(|e| anyhow::anyhow!(e)),
        Commands::Download(ref cmd) => cmd.execute(&cli).await.map_err(|e| anyhow::anyhow!(e)),
    };

    if let Err(e) = result {
        // A rejected token has already been printed
        if !matches!(e.downcast_ref::<CliError>(), Some(CliError::AuthError(_))) {
            error!("Command failed: {}", e);
        }
        std::process::exit(1);
    }
}
