//! Download configuration constants

use std::time::Duration;

/// Wait between attempts when a replay download does not answer 200.
/// Retries are unbounded; the service expects callers to wait failures out.
pub const RETRY_INTERVAL: Duration = Duration::from_millis(60_000);

/// Default pause after each downloaded replay, also used as the throttle's
/// safety margin.
pub const DEFAULT_ITEM_DELAY: Duration = Duration::from_millis(500);

/// Requests allowed per rate-limit window
pub const WINDOW_MAX_REQUESTS: u32 = 15;

/// Length of the rate-limit window
pub const WINDOW_LENGTH: Duration = Duration::from_millis(60_000);

/// Minimum spacing between consecutive items
pub const MIN_ITEM_SPACING: Duration = Duration::from_millis(1_000);

/// File extension for downloaded replays
pub const REPLAY_EXTENSION: &str = "replay";
