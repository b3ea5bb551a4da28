//! # Ballchasing Downloader Library
//!
//! Retrieves replay listings and binary replay files from the
//! [ballchasing.com](https://ballchasing.com) API while staying inside the
//! service's request-rate window and never leaving half-written replay files
//! behind after a failed request.
//!
//! ## Features
//!
//! - **Credential check**: classify an API token against the status endpoint
//! - **Cursor pagination**: follow `next` links until the listing is exhausted
//! - **Retrying downloads**: fixed 60 second backoff, unbounded, with partial
//!   file cleanup between attempts
//! - **Throttled batches**: 15 requests per window with a minimum spacing
//!   between items
//! - **Existing-file policy**: keep, overwrite, or ask through a pluggable prompt
//!
//! ## Quick Start
//!
//! ```no_run
//! use ballchasing_downloader::api::{BallchasingHttpClient, Credential, PaginationHelper};
//! use ballchasing_downloader::api::auth::validate_credential;
//! use ballchasing_downloader::downloader::{BatchThrottler, DownloadOptions, ReplayDownloader};
//! use futures_util::stream;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(BallchasingHttpClient::with_defaults(Credential::new("my-token"))?);
//!
//! let status = validate_credential(&client).await?;
//! if !status.is_valid() {
//!     return Err(status.to_string().into());
//! }
//!
//! let start = PaginationHelper::my_replays_url(&client);
//! let ids = PaginationHelper::collect_replay_ids(&client, start).await?;
//!
//! let options = DownloadOptions::new("./replays").with_keep_existing(true);
//! let downloader = ReplayDownloader::new(client, options);
//! let summary = BatchThrottler::new(downloader).run(stream::iter(ids)).await?;
//! println!("downloaded {} replays", summary.downloaded);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`query`] - Query string building for listing filters
//! - [`api`] - HTTP client, credential validation and cursor pagination
//! - [`downloader`] - Single-replay downloader and the throttled batch runner
//! - [`cli`] - Command-line front end
//! - [`metrics`] - Optional Prometheus counters

#![warn(missing_docs)]
#![warn(clippy::all)]

/// HTTP API access
pub mod api;

/// CLI command implementations
pub mod cli;

/// Replay download orchestration
pub mod downloader;

/// Observability counters
pub mod metrics;

/// Query string helpers
pub mod query;

// Re-export commonly used types
pub use api::{BallchasingHttpClient, Credential};
pub use downloader::{BatchThrottler, DownloadOptions, ReplayDownloader};
pub use query::{build_query, QueryParams};
