//! Download metrics
//!
//! Counters are recorded through the `metrics` facade and are no-ops until a
//! recorder is installed. [`init_metrics`] installs the Prometheus exporter
//! with a scrape endpoint on the given address.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info};

static METRICS_INITIALIZED: OnceCell<SocketAddr> = OnceCell::new();

/// Install the Prometheus exporter
///
/// Must be called from within a tokio runtime. Calling it again is a no-op.
///
/// # Arguments
/// * `addr` - Socket address for the scrape endpoint (e.g., "127.0.0.1:9090")
pub fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(existing) = METRICS_INITIALIZED.get() {
        debug!("Metrics already initialized on {}, skipping", existing);
        return Ok(());
    }

    info!("Initializing metrics exporter on {}", addr);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "api_requests_total",
        Unit::Count,
        "HTTP requests made to ballchasing.com, by method and status"
    );
    describe_counter!(
        "listing_pages_total",
        Unit::Count,
        "Replay listing pages fetched"
    );
    describe_counter!(
        "replay_download_retries_total",
        Unit::Count,
        "Replay download attempts that will be retried"
    );
    describe_counter!(
        "replays_skipped_total",
        Unit::Count,
        "Replays skipped because the file already existed"
    );
    describe_counter!(
        "replay_bytes_total",
        Unit::Bytes,
        "Bytes of replay data written to disk"
    );
    describe_histogram!(
        "throttle_wait_seconds",
        Unit::Seconds,
        "Rate-limit waits between replays"
    );

    let _ = METRICS_INITIALIZED.set(addr);
    Ok(())
}

/// Count one API response
pub fn record_api_request(method: &'static str, status: u16) {
    counter!(
        "api_requests_total",
        "method" => method,
        "status" => status.to_string()
    )
    .increment(1);
}

/// Count one listing page
pub fn record_listing_page() {
    counter!("listing_pages_total").increment(1);
}

/// Count one failed download attempt
pub fn record_download_retry() {
    counter!("replay_download_retries_total").increment(1);
}

/// Count one replay kept on disk
pub fn record_replay_skipped() {
    counter!("replays_skipped_total").increment(1);
}

/// Add downloaded bytes
pub fn record_replay_bytes(bytes: u64) {
    counter!("replay_bytes_total").increment(bytes);
}

/// Record a throttle wait
pub fn record_throttle_wait(wait: Duration) {
    histogram!("throttle_wait_seconds").record(wait.as_secs_f64());
}
