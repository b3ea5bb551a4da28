//! Cursor pagination over the replay listing
//!
//! Each page names the URL of the following one in `next`; the walk ends at
//! the first page where `next` is null or missing. There is no page limit and
//! identifiers are not deduplicated. A failed page aborts the whole listing.

use futures_util::stream::{self, Stream, TryStreamExt};
use tracing::debug;

use crate::api::config::BALLCHASING_CONFIG;
use crate::api::http::BallchasingHttpClient;
use crate::api::{ApiError, ApiResult, ReplayPage};
use crate::metrics;
use crate::query::{build_query, QueryParams};

/// Pagination helper for the replay listing endpoint
pub struct PaginationHelper;

impl PaginationHelper {
    /// Listing URL filtered by explicit parameters
    pub fn replays_url(client: &BallchasingHttpClient, params: &QueryParams) -> String {
        format!(
            "{}{}",
            client.url(BALLCHASING_CONFIG.replays_endpoint),
            build_query(params)
        )
    }

    /// Listing URL for replays uploaded by the token's owner
    pub fn my_replays_url(client: &BallchasingHttpClient) -> String {
        let mut params = QueryParams::new();
        params.insert("uploader".to_string(), "me".to_string());
        params.insert(
            "count".to_string(),
            BALLCHASING_CONFIG.my_replays_page_size.to_string(),
        );
        Self::replays_url(client, &params)
    }

    /// Fetch and parse a single page
    pub async fn fetch_page(client: &BallchasingHttpClient, url: &str) -> ApiResult<ReplayPage> {
        let page: ReplayPage = client.get_json(url).await?;
        metrics::record_listing_page();
        Ok(page)
    }

    /// Walk the listing page by page, starting at `start_url`
    ///
    /// The stream ends after the page without `next`, or right after the
    /// first error.
    pub fn page_stream(
        client: &BallchasingHttpClient,
        start_url: String,
    ) -> impl Stream<Item = ApiResult<ReplayPage>> + '_ {
        stream::try_unfold(
            (Some(start_url), 0usize),
            move |(current, fetched)| async move {
                let Some(url) = current else {
                    debug!("Pagination complete after {} page(s)", fetched);
                    return Ok::<_, ApiError>(None);
                };

                debug!("Fetching replay page {}: {}", fetched + 1, url);
                let mut page = Self::fetch_page(client, &url).await?;
                debug!("Received {} replays in page {}", page.list.len(), fetched + 1);

                let next = page.next.take();
                Ok(Some((page, (next, fetched + 1))))
            },
        )
    }

    /// Replay identifiers in listing order, yielded page by page
    pub fn replay_id_stream(
        client: &BallchasingHttpClient,
        start_url: String,
    ) -> impl Stream<Item = ApiResult<String>> + '_ {
        Self::page_stream(client, start_url)
            .map_ok(|page| stream::iter(page.into_ids().into_iter().map(Ok::<String, ApiError>)))
            .try_flatten()
    }

    /// Collect every replay identifier of the listing
    ///
    /// # Errors
    /// Any page failure discards the identifiers gathered so far and returns
    /// the error.
    pub async fn collect_replay_ids(
        client: &BallchasingHttpClient,
        start_url: String,
    ) -> ApiResult<Vec<String>> {
        let ids: Vec<String> = Self::replay_id_stream(client, start_url)
            .try_collect()
            .await?;

        debug!("Listing complete. Total replays: {}", ids.len());
        Ok(ids)
    }
}
