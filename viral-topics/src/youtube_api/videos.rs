//! `videos.list` with `part=statistics`.

use crate::youtube_api::types::parse_count;
use serde::Deserialize;

/// Body of a `videos.list` response.
///
/// Ids the API does not know (deleted or private videos) are silently left
/// out, so `items` can be shorter than the batch that was asked for.
///
/// <https://developers.google.com/youtube/v3/docs/videos/list>
#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<Video>,
}

/// A video with only its `statistics` part filled in.
#[derive(Debug, Deserialize)]
pub struct Video {
    pub id: String,
    pub statistics: Option<VideoStatistics>,
}

/// Counters of a video, sent by the API as decimal strings.
///
/// <https://developers.google.com/youtube/v3/docs/videos#statistics>
#[derive(Debug, Default, Deserialize)]
pub struct VideoStatistics {
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
}

/// View count of one video, as joined against search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoStats {
    pub video_id: String,
    pub view_count: u64,
}

impl From<Video> for VideoStats {
    fn from(video: Video) -> Self {
        let view_count = parse_count(
            "viewCount",
            video
                .statistics
                .as_ref()
                .and_then(|s| s.view_count.as_deref()),
        );
        Self {
            video_id: video.id,
            view_count,
        }
    }
}
