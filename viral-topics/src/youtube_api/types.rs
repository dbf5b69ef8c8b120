//! Shared types for the YouTube API client.

/// Paging details of a list response. Only the first page is ever read.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, Default, serde::Deserialize)]
pub struct PageInfo {
    /// An approximation of how many results exist in total.
    #[serde(rename = "totalResults", default)]
    pub total_results: u32,
}

/// Parses one of the API's decimal-string counters.
///
/// The API reports counts such as `viewCount` as JSON strings. A missing
/// counter counts as zero, and so does one that fails to parse.
pub(crate) fn parse_count(field: &'static str, raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };
    match raw.parse() {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(field, raw, "ignoring unparseable count: {e}");
            0
        }
    }
}
