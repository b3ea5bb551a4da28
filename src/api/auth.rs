//! Credential validation against the status endpoint
//!
//! Exactly one request, no retry. A rejected or malformed credential is a
//! classification result, not an error; only unexpected transport failures
//! surface as [`ApiError`].

use serde::Deserialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::api::config::BALLCHASING_CONFIG;
use crate::api::http::BallchasingHttpClient;
use crate::api::{ApiError, ApiResult};
use crate::metrics;

/// Outcome of checking a credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialStatus {
    /// The service answered 200
    Valid,
    /// The service answered with another status; carries the diagnostic
    Rejected(String),
    /// The credential could not be turned into a request
    MalformedCredential,
}

impl CredentialStatus {
    /// Whether further calls may proceed
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("no error"),
            Self::Rejected(message) => write!(f, "credential rejected: {message}"),
            Self::MalformedCredential => {
                f.write_str("credential could not be sent, possibly invalid format")
            }
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Turn a non-200 status and its body into a diagnostic message.
///
/// Uses the body's `error` field when the body is JSON carrying one as a
/// string, otherwise a generic message naming the status.
pub fn rejection_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => {
            format!("non-200 response without a parseable error message (status {status})")
        }
    }
}

/// Check a credential with a single `GET /api/`
///
/// # Errors
/// Returns [`ApiError::Network`] when the service cannot be reached at all.
pub async fn validate_credential(client: &BallchasingHttpClient) -> ApiResult<CredentialStatus> {
    let url = client.url(BALLCHASING_CONFIG.status_endpoint);

    let response = match client.get(&url).await {
        Ok(response) => response,
        Err(ApiError::MalformedCredential) => {
            warn!("Credential could not be encoded as a header value");
            return Ok(CredentialStatus::MalformedCredential);
        }
        Err(e) => return Err(e),
    };

    let status = response.status().as_u16();
    metrics::record_api_request("GET", status);

    if status == 200 {
        info!("Credential accepted");
        return Ok(CredentialStatus::Valid);
    }

    let body = response.text().await.unwrap_or_default();
    debug!("Credential check returned {}: {}", status, body);
    let message = rejection_message(status, &body);
    warn!("Credential rejected ({}): {}", status, message);

    Ok(CredentialStatus::Rejected(message))
}
