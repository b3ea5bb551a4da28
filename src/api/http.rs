//! HTTP client shared by every ballchasing.com interaction
//!
//! Carries the base URL and the bearer credential. Requests are issued once;
//! retry policy lives with the caller because each endpoint has its own.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::config::BALLCHASING_CONFIG;
use crate::api::{ApiError, ApiResult, Credential};
use crate::metrics;

const USER_AGENT: &str = concat!("ballchasing-downloader/", env!("CARGO_PKG_VERSION"));

/// HTTP client for ballchasing.com
#[derive(Debug, Clone)]
pub struct BallchasingHttpClient {
    client: Client,
    base_url: String,
    credential: Credential,
}

impl BallchasingHttpClient {
    /// Create a client from an existing `reqwest` client
    ///
    /// # Arguments
    /// * `client` - HTTP client (internally reference counted)
    /// * `base_url` - Service root without trailing slash (e.g., "<https://ballchasing.com>")
    /// * `credential` - Token sent in the `Authorization` header
    pub fn new(client: Client, base_url: impl Into<String>, credential: Credential) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            credential,
        }
    }

    /// Create a client for the production service
    pub fn with_defaults(credential: Credential) -> ApiResult<Self> {
        Self::with_base_url(BALLCHASING_CONFIG.base_url, credential)
    }

    /// Create a client with a default `reqwest` configuration and a custom base URL
    pub fn with_base_url(base_url: impl Into<String>, credential: Credential) -> ApiResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::new(client, base_url, credential))
    }

    /// Service root
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build the `Authorization` header value.
    ///
    /// Fails with [`ApiError::MalformedCredential`] when the token holds
    /// characters a header cannot carry (control characters, newlines).
    pub fn authorization(&self) -> ApiResult<HeaderValue> {
        let mut value = HeaderValue::from_str(self.credential.expose())
            .map_err(|_| ApiError::MalformedCredential)?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Issue an authenticated GET and return the raw response, whatever its status
    pub async fn get(&self, url: &str) -> ApiResult<Response> {
        let authorization = self.authorization()?;
        debug!("GET {}", url);

        self.client
            .get(url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    /// Issue an authenticated POST with an empty body and return the raw response
    pub async fn post(&self, url: &str) -> ApiResult<Response> {
        let authorization = self.authorization()?;
        debug!("POST {}", url);

        self.client
            .post(url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    /// GET a URL and deserialize a JSON body
    ///
    /// # Errors
    /// [`ApiError::Http`] for any non-2xx status, [`ApiError::Parse`] when the
    /// body is not the expected JSON, [`ApiError::Network`] on transport failure.
    pub async fn get_json<T>(&self, url: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.get(url).await?;
        let status = response.status();
        metrics::record_api_request("GET", status.as_u16());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read response body: {e}")))?;

        serde_json::from_str(&body)
            .map_err(|e| ApiError::Parse(format!("failed to deserialize response: {e}")))
    }
}
