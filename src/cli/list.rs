//! List subcommand

use clap::Parser;
use tracing::info;

use super::validate::ensure_valid_credential;
use super::{Cli, CliError, ListingArgs};
use crate::api::PaginationHelper;

/// Print every replay identifier of a listing, one per line
#[derive(Parser, Debug)]
pub struct ListCommand {
    /// Replay selection
    #[command(flatten)]
    pub listing: ListingArgs,
}

impl ListCommand {
    /// Execute the list command
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let client = cli.http_client()?;
        ensure_valid_credential(&client).await?;

        let start_url = self.listing.start_url(&client);
        let ids = PaginationHelper::collect_replay_ids(&client, start_url).await?;

        for id in &ids {
            println!("{id}");
        }
        info!("Listed {} replay(s)", ids.len());
        Ok(())
    }
}
