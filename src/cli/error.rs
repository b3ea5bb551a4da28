//! CLI error types and conversions

use crate::api::ApiError;
use crate::downloader::DownloadError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Credential rejected or malformed
    #[error("authentication failed: {0}")]
    AuthError(String),

    /// API error, including failed listing pages
    #[error("API error: {0}")]
    ApiError(#[from] ApiError),

    /// Download error
    #[error("download error: {0}")]
    DownloadError(#[from] DownloadError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
