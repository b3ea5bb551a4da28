//! Validation subcommand

use clap::Parser;
use tracing::info;

use super::{Cli, CliError};
use crate::api::auth::{validate_credential, CredentialStatus};
use crate::api::BallchasingHttpClient;

/// Check the API token against the service
#[derive(Parser, Debug)]
pub struct ValidateCommand {}

impl ValidateCommand {
    /// Execute the validation command
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let client = cli.http_client()?;
        ensure_valid_credential(&client).await?;
        println!("API token is valid");
        Ok(())
    }
}

/// Validate the credential, turning anything but 200 into [`CliError::AuthError`]
pub async fn ensure_valid_credential(client: &BallchasingHttpClient) -> Result<(), CliError> {
    match validate_credential(client).await? {
        CredentialStatus::Valid => {
            info!("API token accepted by {}", client.base_url());
            Ok(())
        }
        status => {
            eprintln!("Invalid API token: {status}");
            Err(CliError::AuthError(status.to_string()))
        }
    }
}
