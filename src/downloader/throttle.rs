//! Rate-limit bookkeeping for batch downloads
//!
//! The window check compares the counter against [`WINDOW_MAX_REQUESTS`] but
//! measures only the elapsed time of the item that just finished, not the
//! whole window. A run of fast requests followed by a slow one therefore
//! waits less than a true 60 second window would require.

use std::time::Duration;

use crate::downloader::config::{MIN_ITEM_SPACING, WINDOW_LENGTH, WINDOW_MAX_REQUESTS};

/// What to do after an item finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// The window is full; wait, then reset the request counter
    WindowFull(Duration),
    /// The item was fast; wait to keep the minimum spacing
    Spacing(Duration),
    /// The item was slow enough already
    Proceed,
}

impl ThrottleDecision {
    /// Time to wait before the next item
    pub fn wait(&self) -> Duration {
        match self {
            Self::WindowFull(wait) | Self::Spacing(wait) => *wait,
            Self::Proceed => Duration::ZERO,
        }
    }
}

/// Request counter and the most recent item's elapsed time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThrottleState {
    request_count: u32,
    last_elapsed: Duration,
}

impl ThrottleState {
    /// Fresh state for a new batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests counted in the current window
    pub fn request_count(&self) -> u32 {
        self.request_count
    }

    /// Elapsed time of the most recently recorded item
    pub fn last_elapsed(&self) -> Duration {
        self.last_elapsed
    }

    /// Record a finished item and decide the wait before the next one.
    ///
    /// `requested` is false for items skipped by the existing-file policy;
    /// those never count toward the window.
    pub fn record_item(
        &mut self,
        requested: bool,
        elapsed: Duration,
        safety_delay: Duration,
    ) -> ThrottleDecision {
        if requested {
            self.request_count += 1;
        }
        self.last_elapsed = elapsed;

        if self.request_count >= WINDOW_MAX_REQUESTS && elapsed <= WINDOW_LENGTH {
            ThrottleDecision::WindowFull(safety_delay + (WINDOW_LENGTH - elapsed))
        } else if elapsed <= MIN_ITEM_SPACING {
            ThrottleDecision::Spacing(safety_delay + (MIN_ITEM_SPACING - elapsed))
        } else {
            ThrottleDecision::Proceed
        }
    }

    /// Start a new window after its wait has been served
    pub fn reset_window(&mut self) {
        self.request_count = 0;
    }
}
