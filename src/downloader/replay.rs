//! Single replay download with existing-file policy and unbounded retry
//!
//! The target `{output_dir}/{id}.replay` is inspected first:
//!
//! | target  | switch          | action                         |
//! |---------|-----------------|--------------------------------|
//! | absent  | -               | fetch                          |
//! | present | keep existing   | skip, no request               |
//! | present | overwrite       | delete, fetch                  |
//! | present | neither         | ask the prompt; delete or skip |
//!
//! Fetching streams the body straight into the target. Any attempt that does
//! not end in a complete 200 response removes what it wrote, waits
//! [`RETRY_INTERVAL`] and tries again, with no upper bound on attempts.

use futures_util::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use crate::api::config::BALLCHASING_CONFIG;
use crate::api::{ApiError, BallchasingHttpClient};
use crate::downloader::clock::{Clock, TokioClock};
use crate::downloader::config::{DEFAULT_ITEM_DELAY, REPLAY_EXTENSION, RETRY_INTERVAL};
use crate::downloader::prompt::{OverwritePrompt, StdinPrompt};
use crate::downloader::DownloadError;
use crate::metrics;

/// Path a replay is written to
pub fn replay_path(output_dir: &Path, replay_id: &str) -> PathBuf {
    output_dir.join(format!("{replay_id}.{REPLAY_EXTENSION}"))
}

/// Output location, pacing and existing-file policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Directory receiving `{id}.replay` files
    pub output_dir: PathBuf,
    /// Pause after each downloaded replay
    pub item_delay: Duration,
    /// Replace existing files without asking
    pub overwrite: bool,
    /// Leave existing files alone without asking; wins over `overwrite`
    pub keep_existing: bool,
}

impl DownloadOptions {
    /// Options with the default delay and the interactive policy
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            item_delay: DEFAULT_ITEM_DELAY,
            overwrite: false,
            keep_existing: false,
        }
    }

    /// Set the pause after each downloaded replay
    pub fn with_item_delay(mut self, item_delay: Duration) -> Self {
        self.item_delay = item_delay;
        self
    }

    /// Replace existing files without asking
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Keep existing files without asking
    pub fn with_keep_existing(mut self, keep_existing: bool) -> Self {
        self.keep_existing = keep_existing;
        self
    }
}

/// Result of handling one replay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The replay was fetched
    Downloaded {
        /// Bytes written to the target
        bytes: u64,
        /// Attempts needed, at least 1
        attempts: u32,
    },
    /// An existing file was kept; nothing was requested
    Skipped,
}

impl DownloadOutcome {
    /// Whether a network request was issued for this replay
    pub fn requested_network(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }
}

/// Why a single attempt did not produce the file
enum AttemptFailure {
    /// Non-200 status or a transport failure; retried
    Transient(String),
    /// Local filesystem failure; not retried
    Io(std::io::Error),
    /// The request could not be built; retrying cannot help
    Fatal(ApiError),
}

impl From<std::io::Error> for AttemptFailure {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Downloads one replay at a time
pub struct ReplayDownloader {
    client: Arc<BallchasingHttpClient>,
    options: DownloadOptions,
    clock: Arc<dyn Clock>,
    prompt: Arc<dyn OverwritePrompt>,
}

impl ReplayDownloader {
    /// Create a downloader using the real clock and the terminal prompt
    pub fn new(client: Arc<BallchasingHttpClient>, options: DownloadOptions) -> Self {
        Self {
            client,
            options,
            clock: Arc::new(TokioClock),
            prompt: Arc::new(StdinPrompt),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the overwrite prompt.
    ///
    /// The prompt is called directly on the async task driving the download,
    /// so a blocking prompt such as [`StdinPrompt`] stalls that task until
    /// it is answered.
    pub fn with_prompt(mut self, prompt: Arc<dyn OverwritePrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Configured options
    pub fn options(&self) -> &DownloadOptions {
        &self.options
    }

    /// Time source shared with the batch throttler
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Download one replay into the output directory.
    ///
    /// Returns only once the replay is on disk or was skipped; failed
    /// requests are retried forever. With `skip_delay` unset, sleeps the
    /// configured item delay after a download.
    ///
    /// # Errors
    /// Local filesystem failures, and a credential that cannot be put in a
    /// request header.
    pub async fn download(
        &self,
        replay_id: &str,
        skip_delay: bool,
    ) -> Result<DownloadOutcome, DownloadError> {
        let target = replay_path(&self.options.output_dir, replay_id);

        if !self.prepare_target(&target).await? {
            info!("Keeping existing replay {}", target.display());
            metrics::record_replay_skipped();
            return Ok(DownloadOutcome::Skipped);
        }

        let (bytes, attempts) = self.fetch_until_success(replay_id, &target).await?;
        info!(
            "Downloaded replay {} to {} ({} bytes)",
            replay_id,
            target.display(),
            bytes
        );

        if !skip_delay && !self.options.item_delay.is_zero() {
            debug!("Sleeping {:?} before next replay", self.options.item_delay);
            self.clock.sleep(self.options.item_delay).await;
        }

        Ok(DownloadOutcome::Downloaded { bytes, attempts })
    }

    /// Apply the existing-file policy. Returns whether to fetch.
    async fn prepare_target(&self, target: &Path) -> Result<bool, DownloadError> {
        if !tokio::fs::try_exists(target).await? {
            return Ok(true);
        }

        if self.options.keep_existing {
            return Ok(false);
        }

        if !self.options.overwrite && !self.prompt.confirm_overwrite(target) {
            return Ok(false);
        }

        warn!("Removing existing replay {}", target.display());
        tokio::fs::remove_file(target).await?;
        Ok(true)
    }

    async fn fetch_until_success(
        &self,
        replay_id: &str,
        target: &Path,
    ) -> Result<(u64, u32), DownloadError> {
        let url = self
            .client
            .url(&format!("{}{}", BALLCHASING_CONFIG.download_endpoint, replay_id));
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            match self.attempt(&url, target).await {
                Ok(bytes) => return Ok((bytes, attempts)),
                Err(failure) => {
                    remove_partial(target).await?;
                    match failure {
                        AttemptFailure::Io(e) => return Err(e.into()),
                        AttemptFailure::Fatal(e) => return Err(e.into()),
                        AttemptFailure::Transient(reason) => {
                            warn!(
                                "Download of replay {} failed on attempt {} ({}), retrying in {}s",
                                replay_id,
                                attempts,
                                reason,
                                RETRY_INTERVAL.as_secs()
                            );
                            metrics::record_download_retry();
                            self.clock.sleep(RETRY_INTERVAL).await;
                        }
                    }
                }
            }
        }
    }

    async fn attempt(&self, url: &str, target: &Path) -> Result<u64, AttemptFailure> {
        let response = self
            .client
            .post(url)
            .await
            .map_err(|e| match e {
                ApiError::MalformedCredential => AttemptFailure::Fatal(e),
                other => AttemptFailure::Transient(other.to_string()),
            })?;

        let status = response.status().as_u16();
        metrics::record_api_request("POST", status);
        if status != 200 {
            return Err(AttemptFailure::Transient(format!("status {status}")));
        }

        let mut writer = BufWriter::new(File::create(target).await?);
        let mut body = response.bytes_stream();
        let mut bytes = 0u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| AttemptFailure::Transient(e.to_string()))?;
            writer.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }
        writer.flush().await?;

        metrics::record_replay_bytes(bytes);
        Ok(bytes)
    }
}

/// Delete a partially written target, if any
async fn remove_partial(target: &Path) -> Result<(), DownloadError> {
    match tokio::fs::remove_file(target).await {
        Ok(()) => {
            debug!("Removed partial file {}", target.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
