//! YouTube Search API types.

use crate::youtube_api::types::PageInfo;
use serde::Deserialize;

/// Response structure for the `search.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/search/list>
#[derive(Debug, Deserialize)]
pub struct SearchListResponse {
    /// The search results, in the order requested by the `order` parameter.
    ///
    /// The API omits the field entirely when nothing matched.
    #[serde(default)]
    pub items: Vec<SearchItem>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
}

/// A `searchResult` resource.
///
/// Both halves are optional on the wire; a result without them cannot be
/// enriched and is dropped later on.
///
/// See: <https://developers.google.com/youtube/v3/docs/search#resource>
#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: Option<SearchItemId>,
    pub snippet: Option<SearchSnippet>,
}

/// Identifies the resource that matched the search request.
#[derive(Debug, Deserialize)]
pub struct SearchItemId {
    /// Only present for video results.
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

/// Basic details about a search result.
#[derive(Debug, Deserialize)]
pub struct SearchSnippet {
    /// The ID of the channel that published the resource.
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// One search hit, flattened to the fields the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub video_id: Option<String>,
    pub channel_id: Option<String>,
    pub title: String,
    pub description: String,
}

impl From<SearchItem> for SearchResult {
    fn from(item: SearchItem) -> Self {
        let video_id = item
            .id
            .and_then(|id| id.video_id)
            .filter(|id| !id.is_empty());
        let (channel_id, title, description) = match item.snippet {
            Some(snippet) => (
                snippet.channel_id.filter(|id| !id.is_empty()),
                snippet.title,
                snippet.description,
            ),
            None => (None, None, None),
        };
        Self {
            video_id,
            channel_id,
            title: title.unwrap_or_else(|| "N/A".to_string()),
            description: description.unwrap_or_default(),
        }
    }
}
