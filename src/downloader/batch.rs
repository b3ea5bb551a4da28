//! Throttled batch downloads
//!
//! Identifiers are processed strictly in order, one request at a time. After
//! each item the [`ThrottleState`] decides how long to wait before the next
//! one; the configured item delay doubles as the safety margin added to every
//! wait, and the downloader's own post-download delay is suppressed.

use futures_util::{pin_mut, Stream, StreamExt};
use std::time::Duration;
use tracing::{debug, info};

use crate::downloader::replay::{DownloadOutcome, ReplayDownloader};
use crate::downloader::throttle::{ThrottleDecision, ThrottleState};
use crate::downloader::DownloadError;
use crate::metrics;

/// Totals for a finished batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Replays fetched from the service
    pub downloaded: u64,
    /// Replays kept because a file already existed
    pub skipped: u64,
    /// Time spent in throttle waits
    pub throttle_wait: Duration,
}

impl BatchSummary {
    fn record(&mut self, outcome: &DownloadOutcome, wait: Duration) {
        if outcome.requested_network() {
            self.downloaded += 1;
        } else {
            self.skipped += 1;
        }
        self.throttle_wait += wait;
    }
}

/// Drives a [`ReplayDownloader`] over a sequence of identifiers
pub struct BatchThrottler {
    downloader: ReplayDownloader,
    state: ThrottleState,
}

impl BatchThrottler {
    /// Wrap a downloader with fresh throttle state
    pub fn new(downloader: ReplayDownloader) -> Self {
        Self {
            downloader,
            state: ThrottleState::new(),
        }
    }

    /// Current throttle state
    pub fn state(&self) -> &ThrottleState {
        &self.state
    }

    /// Underlying downloader
    pub fn downloader(&self) -> &ReplayDownloader {
        &self.downloader
    }

    /// Download every identifier of `ids`, in order
    ///
    /// # Errors
    /// Stops at the first local filesystem failure.
    pub async fn run<S>(&mut self, ids: S) -> Result<BatchSummary, DownloadError>
    where
        S: Stream<Item = String>,
    {
        self.run_with(ids, |_, _| {}).await
    }

    /// Like [`run`](Self::run), calling `on_item` after each identifier
    pub async fn run_with<S, F>(
        &mut self,
        ids: S,
        mut on_item: F,
    ) -> Result<BatchSummary, DownloadError>
    where
        S: Stream<Item = String>,
        F: FnMut(&str, &DownloadOutcome),
    {
        tokio::fs::create_dir_all(&self.downloader.options().output_dir).await?;
        self.state = ThrottleState::new();

        let mut summary = BatchSummary::default();
        pin_mut!(ids);

        while let Some(id) = ids.next().await {
            let (outcome, wait) = self.process_item(&id).await?;
            summary.record(&outcome, wait);
            on_item(&id, &outcome);
        }

        info!(
            "Batch complete: {} downloaded, {} skipped, {:?} spent throttling",
            summary.downloaded, summary.skipped, summary.throttle_wait
        );
        Ok(summary)
    }

    /// Download one identifier and serve the throttle wait that follows it.
    ///
    /// Returns the outcome and the wait applied.
    pub async fn process_item(
        &mut self,
        replay_id: &str,
    ) -> Result<(DownloadOutcome, Duration), DownloadError> {
        let clock = self.downloader.clock().clone();
        let safety_delay = self.downloader.options().item_delay;

        let started = clock.now();
        let outcome = self.downloader.download(replay_id, true).await?;
        let elapsed = clock.now().saturating_duration_since(started);

        let decision =
            self.state
                .record_item(outcome.requested_network(), elapsed, safety_delay);
        let wait = decision.wait();

        if !wait.is_zero() {
            debug!(
                "Replay {} took {:?}; waiting {:?} ({} request(s) in window)",
                replay_id,
                elapsed,
                wait,
                self.state.request_count()
            );
            metrics::record_throttle_wait(wait);
            clock.sleep(wait).await;
        }

        if let ThrottleDecision::WindowFull(_) = decision {
            info!("Rate-limit window full, waited {:?}", wait);
            self.state.reset_window();
        }

        Ok((outcome, wait))
    }
}
