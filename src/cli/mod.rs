//! CLI command implementations

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::config::BALLCHASING_CONFIG;
use crate::api::{BallchasingHttpClient, Credential, PaginationHelper};
use crate::query::{parse_param, QueryParams};

pub mod download;
pub mod error;
pub mod list;
pub mod validate;

pub use download::DownloadCommand;
pub use error::CliError;
pub use list::ListCommand;
pub use validate::ValidateCommand;

/// ballchasing.com replay downloader
#[derive(Parser, Debug)]
#[command(name = "ballchasing-downloader", version, about)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// API token from ballchasing.com
    #[arg(long, global = true, env = "BALLCHASING_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Service root URL
    #[arg(long, global = true, default_value = BALLCHASING_CONFIG.base_url)]
    pub base_url: String,

    /// Serve Prometheus metrics on this address (e.g., 127.0.0.1:9090)
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the API token
    Validate(ValidateCommand),

    /// Print replay identifiers matching a query
    List(ListCommand),

    /// Download replays matching a query
    Download(DownloadCommand),
}

impl Cli {
    /// Build the HTTP client from the global flags
    pub fn http_client(&self) -> Result<Arc<BallchasingHttpClient>, CliError> {
        let token = self.token.as_deref().ok_or_else(|| {
            CliError::InvalidArgument(
                "missing API token: pass --token or set BALLCHASING_TOKEN".to_string(),
            )
        })?;

        let client = BallchasingHttpClient::with_base_url(&self.base_url, Credential::new(token))?;
        Ok(Arc::new(client))
    }
}

/// Selection of replays shared by `list` and `download`
#[derive(Args, Debug, Clone)]
pub struct ListingArgs {
    /// Listing filter as name=value (repeatable), e.g. --param season=f9
    #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Replays uploaded by the token's owner (the default without --param)
    #[arg(long, conflicts_with = "params")]
    pub mine: bool,
}

impl ListingArgs {
    /// First listing URL for this selection
    pub fn start_url(&self, client: &BallchasingHttpClient) -> String {
        if self.mine || self.params.is_empty() {
            return PaginationHelper::my_replays_url(client);
        }

        let params: QueryParams = self.params.iter().cloned().collect();
        PaginationHelper::replays_url(client, &params)
    }
}
