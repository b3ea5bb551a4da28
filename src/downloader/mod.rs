//! Replay download orchestration
//!
//! # Overview
//!
//! 1. **Single replay**: [`replay::ReplayDownloader`] applies the existing-file
//!    policy and retries a failed download every 60 seconds until it succeeds
//! 2. **Batch**: [`batch::BatchThrottler`] feeds identifiers to the downloader
//!    one at a time and inserts rate-limit waits
//! 3. **Throttle state**: [`throttle::ThrottleState`] holds the request counter
//! 4. **Capabilities**: [`clock::Clock`] and [`prompt::OverwritePrompt`] are
//!    injected so waits and overwrite answers can be controlled
//!
//! # Error Handling
//!
//! Failed requests never surface here; they are retried. Only local
//! filesystem failures and an unusable credential are returned as
//! [`DownloadError`].

pub mod batch;
pub mod clock;
pub mod config;
pub mod prompt;
pub mod replay;
pub mod throttle;

pub use batch::{BatchSummary, BatchThrottler};
pub use clock::{Clock, ManualClock, TokioClock};
pub use prompt::{FixedAnswer, OverwritePrompt, StdinPrompt};
pub use replay::{replay_path, DownloadOptions, DownloadOutcome, ReplayDownloader};
pub use throttle::{ThrottleDecision, ThrottleState};

/// Download errors
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Local filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request could not be built (malformed credential)
    #[error("API error: {0}")]
    Api(#[from] crate::api::ApiError),
}
