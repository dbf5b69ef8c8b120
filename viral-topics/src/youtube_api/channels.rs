//! `channels.list` with `part=statistics`.

use crate::youtube_api::types::parse_count;
use serde::Deserialize;

/// Body of a `channels.list` response.
///
/// <https://developers.google.com/youtube/v3/docs/channels/list>
#[derive(Debug, Deserialize)]
pub struct ChannelListResponse {
    /// One entry per distinct channel: asking for the same channel twice
    /// yields a single item.
    #[serde(default)]
    pub items: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
pub struct Channel {
    pub id: String,
    pub statistics: Option<ChannelStatistics>,
}

/// <https://developers.google.com/youtube/v3/docs/channels#statistics>
#[derive(Debug, Default, Deserialize)]
pub struct ChannelStatistics {
    /// Rounded down to three significant figures by the API, and absent when
    /// the owner hides it.
    #[serde(rename = "subscriberCount")]
    pub subscriber_count: Option<String>,
    #[serde(rename = "hiddenSubscriberCount", default)]
    pub hidden_subscriber_count: bool,
}

/// Subscriber count of one channel, as joined against search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStats {
    pub channel_id: String,
    pub subscriber_count: u64,
}

impl From<Channel> for ChannelStats {
    fn from(channel: Channel) -> Self {
        let statistics = channel.statistics.as_ref();
        if statistics.is_some_and(|s| s.hidden_subscriber_count) {
            tracing::debug!(channel_id = channel.id, "subscriber count is hidden, using 0");
        }
        let subscriber_count = parse_count(
            "subscriberCount",
            statistics.and_then(|s| s.subscriber_count.as_deref()),
        );
        Self {
            channel_id: channel.id,
            subscriber_count,
        }
    }
}
