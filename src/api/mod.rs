//! HTTP API access for ballchasing.com

use serde::Deserialize;
use std::fmt;

pub mod auth;
pub mod config;
pub mod http;
pub mod pagination;

pub use auth::{validate_credential, CredentialStatus};
pub use config::{ApiConfig, BALLCHASING_CONFIG};
pub use http::BallchasingHttpClient;
pub use pagination::PaginationHelper;

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The credential cannot be encoded as a header value
    #[error("credential could not be sent, possibly invalid format")]
    MalformedCredential,

    /// Transport failure (DNS, connection, body read)
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP error {status}: {body}")]
    Http {
        /// Response status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Response body could not be deserialized
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Bearer credential presented on every request.
///
/// The token is opaque; it is never parsed, and `Debug` does not print it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token text
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// One entry of a replay listing. Only the identifier is used.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Replay identifier
    pub id: String,
}

/// One page of the replay listing
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReplayPage {
    /// Replays on this page, in service order
    pub list: Vec<ReplaySummary>,
    /// Full URL of the following page; `None` on the last page
    #[serde(default)]
    pub next: Option<String>,
}

impl ReplayPage {
    /// Identifiers on this page, in order
    pub fn into_ids(self) -> Vec<String> {
        self.list.into_iter().map(|replay| replay.id).collect()
    }
}
