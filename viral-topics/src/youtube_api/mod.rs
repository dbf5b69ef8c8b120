//! A small, read-only client for the YouTube Data API v3.
//!
//! Only the three read-only endpoints needed to find small channels with fast-growing videos
//! are covered:
//!
//! - `search.list` to find the most viewed recent videos for a query ([`YouTubeClient::search_videos`])
//! - `videos.list` with `part=statistics` for view counts ([`YouTubeClient::list_video_statistics`])
//! - `channels.list` with `part=statistics` for subscriber counts ([`YouTubeClient::list_channel_statistics`])
//!
//! The two statistics calls are batched: all ids go into one comma-separated `id` parameter.
//!
//! Every call returns a [`Fetched`], which separates "here is the data" from "the API said
//! no" (`403`) and "the API kept failing". See [`retry`] for the exact retry rules.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use youtube_viral_topics::youtube_api::{Fetched, YouTubeClient};
//!
//! # async fn example() -> eyre::Result<()> {
//! let client = YouTubeClient::new("api-key", youtube_viral_topics::youtube_api::DEFAULT_BASE_URL, reqwest::Client::new());
//! let since = jiff::Timestamp::now() - jiff::SignedDuration::from_hours(24);
//! if let Fetched::Data(results) = client.search_videos("rust", since, 5).await? {
//!     for item in results.items {
//!         println!("{:?}", item.snippet.and_then(|s| s.title));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod client;
pub mod retry;
pub mod search;
pub mod types;
pub mod videos;

pub use client::{DEFAULT_BASE_URL, YouTubeClient};
pub use retry::{Fetched, RetryPolicy};
pub use types::PageInfo;

pub use channels::{Channel, ChannelStatistics, ChannelStats};
pub use search::{SearchItem, SearchResult, SearchSnippet};
pub use videos::{Video, VideoStatistics, VideoStats};
