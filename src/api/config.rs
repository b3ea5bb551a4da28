//! ballchasing.com endpoint configuration
//!
//! Paths are relative to `base_url`; the download endpoint takes the replay
//! identifier appended to `download_endpoint`.

/// Endpoint layout of the service
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL (e.g., <https://ballchasing.com>)
    pub base_url: &'static str,

    /// Credential status endpoint
    pub status_endpoint: &'static str,

    /// Replay listing endpoint
    pub replays_endpoint: &'static str,

    /// Replay download endpoint prefix
    pub download_endpoint: &'static str,

    /// Page size used for the "my uploads" listing
    pub my_replays_page_size: u32,
}

/// Production service configuration
pub const BALLCHASING_CONFIG: ApiConfig = ApiConfig {
    base_url: "https://ballchasing.com",
    status_endpoint: "/api/",
    replays_endpoint: "/api/replays",
    download_endpoint: "/dl/replay/",
    my_replays_page_size: 200,
};
