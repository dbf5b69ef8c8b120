//! Core YouTube API client functionality.

use crate::youtube_api::{
    channels::ChannelListResponse,
    retry::{Fetched, RetryPolicy, fetch_with_retry},
    search::SearchListResponse,
    videos::VideoListResponse,
};
use eyre::Context;
use http::StatusCode;
use jiff::Timestamp;
use serde::de::DeserializeOwned;
use tracing::instrument;

/// Where the YouTube Data API v3 lives.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Client for the read-only parts of the YouTube Data API v3.
///
/// Every request is authorized with a plain API key passed as the `key` query
/// parameter, and goes through [`fetch_with_retry`] so that transient failures
/// are retried while quota errors are surfaced immediately.
#[derive(Clone)]
pub struct YouTubeClient {
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
    /// HTTP client for API requests
    client: reqwest::Client,
}

// The API key must not end up in logs.
impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl YouTubeClient {
    /// Creates a new client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - The API key sent with every request
    /// * `base_url` - Root of the API, normally [`DEFAULT_BASE_URL`]
    /// * `client` - Shared HTTP client for making API requests
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
            client,
        }
    }

    /// Replaces the default [`RetryPolicy`].
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Searches for videos matching `query` that were published after `published_after`.
    ///
    /// Results are ordered by view count, highest first, and capped at `max_results`.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/search/list>
    #[instrument(skip(self))]
    pub async fn search_videos(
        &self,
        query: &str,
        published_after: Timestamp,
        max_results: u32,
    ) -> eyre::Result<Fetched<SearchListResponse>> {
        let published_after = published_after.strftime("%Y-%m-%dT%H:%M:%SZ").to_string();
        let max_results = max_results.to_string();
        let query_params = [
            ("part", "snippet"),
            ("q", query),
            ("type", "video"),
            ("order", "viewCount"),
            ("publishedAfter", published_after.as_str()),
            ("maxResults", max_results.as_str()),
        ];

        let fetched: Fetched<SearchListResponse> = self.get_json("search", &query_params).await?;
        if let Fetched::Data(ref response) = fetched {
            tracing::debug!(
                total_results = response.page_info.total_results,
                returned_items = response.items.len(),
                "fetched search results"
            );
        }
        Ok(fetched)
    }

    /// Gets statistics for a batch of videos in a single request.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/videos/list>
    #[instrument(skip(self))]
    pub async fn list_video_statistics(
        &self,
        video_ids: &[&str],
    ) -> eyre::Result<Fetched<VideoListResponse>> {
        let ids = video_ids.join(",");
        let query_params = [("part", "statistics"), ("id", ids.as_str())];

        let fetched: Fetched<VideoListResponse> = self.get_json("videos", &query_params).await?;
        if let Fetched::Data(ref response) = fetched {
            tracing::debug!(
                requested = video_ids.len(),
                returned_items = response.items.len(),
                "fetched video statistics"
            );
        }
        Ok(fetched)
    }

    /// Gets statistics for a batch of channels in a single request.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list>
    #[instrument(skip(self))]
    pub async fn list_channel_statistics(
        &self,
        channel_ids: &[&str],
    ) -> eyre::Result<Fetched<ChannelListResponse>> {
        let ids = channel_ids.join(",");
        let query_params = [("part", "statistics"), ("id", ids.as_str())];

        let fetched: Fetched<ChannelListResponse> =
            self.get_json("channels", &query_params).await?;
        if let Fetched::Data(ref response) = fetched {
            tracing::debug!(
                requested = channel_ids.len(),
                returned_items = response.items.len(),
                "fetched channel statistics"
            );
        }
        Ok(fetched)
    }

    /// Issues a retried GET against `endpoint` and parses a successful body as JSON.
    ///
    /// Only a `200 OK` body is parsed; a body that fails to parse is an error.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> eyre::Result<Fetched<T>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let url = url.as_str();

        let fetched = fetch_with_retry(self.retry, move || self.get_once(url, query_params)).await;
        fetched.try_map(|body| {
            serde_json::from_str(&body)
                .with_context(|| format!("parse YouTube {endpoint} API response as JSON"))
        })
    }

    /// Performs a single GET request and returns its status and body.
    #[instrument(skip(self, query_params), level = "trace")]
    async fn get_once(
        &self,
        url: &str,
        query_params: &[(&str, &str)],
    ) -> eyre::Result<(StatusCode, String)> {
        let response = self
            .client
            .get(url)
            .query(query_params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            // the URL carries the API key
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("send GET request to YouTube API: {url}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("read YouTube API response body")?;

        Ok((status, body))
    }
}
