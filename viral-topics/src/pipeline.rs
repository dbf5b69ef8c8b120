//! The fetch → enrich → filter pipeline, run once per keyword.
//!
//! Keywords are processed strictly in order, one request at a time. Every keyword ends either
//! with its qualifying records appended to the run-wide list, or skipped with a notice in the
//! [`Report`]. Nothing that goes wrong for one keyword stops the next one from running.

use crate::report::{Report, ResultRecord};
use crate::youtube_api::{ChannelStats, Fetched, SearchResult, VideoStats, YouTubeClient};
use eyre::Context;
use jiff::{SignedDuration, Timestamp};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Most search results fetched per keyword.
pub const MAX_RESULTS: u32 = 5;

/// Channels with this many subscribers or more are filtered out.
pub const SUBSCRIBER_LIMIT: u64 = 3000;

/// How far back to search, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaysToSearch(u32);

impl DaysToSearch {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 30;

    pub fn new(days: u32) -> eyre::Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&days) {
            eyre::bail!(
                "days to search must be between {} and {}, got {days}",
                Self::MIN,
                Self::MAX
            );
        }
        Ok(Self(days))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Lower bound of the recency window ending at `now`.
    pub fn published_after(self, now: Timestamp) -> eyre::Result<Timestamp> {
        now.checked_sub(SignedDuration::from_hours(24 * i64::from(self.0)))
            .with_context(|| format!("compute timestamp {} days before {now}", self.0))
    }
}

impl Default for DaysToSearch {
    fn default() -> Self {
        Self(5)
    }
}

impl FromStr for DaysToSearch {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days = s
            .trim()
            .parse::<u32>()
            .with_context(|| format!("days to search must be a whole number, got {s:?}"))?;
        Self::new(days)
    }
}

impl fmt::Display for DaysToSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Why a keyword contributed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The search returned no items.
    NoVideos,
    /// None of the results had a usable video id, or none had a channel id.
    MissingIds,
    NoVideoStats,
    NoChannelStats,
    /// One of the calls was answered with `403`.
    Forbidden,
    /// One of the calls kept failing until retries ran out.
    Unavailable,
    /// Something unexpected went wrong, such as an unparseable response.
    Failed,
}

/// How processing a single keyword ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordOutcome {
    /// The keyword went through every stage and added this many records.
    Collected(usize),
    Skipped(SkipReason),
}

/// Records and per-keyword outcomes of a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub records: Vec<ResultRecord>,
    pub outcomes: Vec<(String, KeywordOutcome)>,
}

/// Statistics for one keyword's results, in the order the API returned them.
#[derive(Debug, Default)]
pub struct Enrichment {
    pub videos: Vec<VideoStats>,
    pub channels: Vec<ChannelStats>,
}

/// Drives the three stages for a list of keywords.
#[derive(Debug, Clone)]
pub struct QueryPipeline {
    client: YouTubeClient,
    keywords: Vec<String>,
}

impl QueryPipeline {
    pub fn new(client: YouTubeClient, keywords: Vec<String>) -> Self {
        Self { client, keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Runs every keyword, then renders the collected records into `report`.
    ///
    /// Only a failure outside of keyword processing makes this return an error.
    #[tracing::instrument(skip(self, report), fields(keywords = self.keywords.len()))]
    pub async fn run(&self, days: DaysToSearch, report: &mut Report) -> eyre::Result<RunSummary> {
        let published_after = days.published_after(Timestamp::now())?;
        tracing::info!(%published_after, "starting run");

        let mut summary = RunSummary::default();
        for keyword in &self.keywords {
            let outcome = match self
                .process_keyword(keyword, published_after, report, &mut summary.records)
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(keyword, "keyword processing failed: {e:?}");
                    report.error(format!("Error while processing keyword {keyword}: {e:#}"));
                    KeywordOutcome::Skipped(SkipReason::Failed)
                }
            };
            tracing::info!(keyword, ?outcome, "finished keyword");
            summary.outcomes.push((keyword.clone(), outcome));
        }

        render_results(&summary.records, report);
        tracing::info!(records = summary.records.len(), "run complete");
        Ok(summary)
    }

    /// Search → Enrich → Filter for a single keyword.
    pub async fn process_keyword(
        &self,
        keyword: &str,
        published_after: Timestamp,
        report: &mut Report,
        records: &mut Vec<ResultRecord>,
    ) -> eyre::Result<KeywordOutcome> {
        report.text(format!("Searching for keyword: {keyword}"));

        let results = match self.search(keyword, published_after, report).await? {
            Ok(results) => results,
            Err(reason) => return Ok(KeywordOutcome::Skipped(reason)),
        };

        let enrichment = match self.enrich(keyword, &results, report).await? {
            Ok(enrichment) => enrichment,
            Err(reason) => return Ok(KeywordOutcome::Skipped(reason)),
        };

        let kept = filter_records(&results, &enrichment);
        let n = kept.len();
        records.extend(kept);
        Ok(KeywordOutcome::Collected(n))
    }

    /// SearchStage: the most viewed recent videos for `keyword`.
    pub async fn search(
        &self,
        keyword: &str,
        published_after: Timestamp,
        report: &mut Report,
    ) -> eyre::Result<Result<Vec<SearchResult>, SkipReason>> {
        let fetched = self
            .client
            .search_videos(keyword, published_after, MAX_RESULTS)
            .await
            .with_context(|| format!("search for {keyword:?}"))?;

        let response = match fetched.into_data() {
            Ok(response) => response,
            Err(failure) => {
                return Ok(Err(report_failure(
                    keyword, "search", "API error", failure, report,
                )));
            }
        };

        if response.items.is_empty() {
            report.warning(format!("No videos found for keyword: {keyword}"));
            return Ok(Err(SkipReason::NoVideos));
        }

        Ok(Ok(response
            .items
            .into_iter()
            .map(SearchResult::from)
            .collect()))
    }

    /// EnrichmentStage: one batched statistics lookup per id type.
    pub async fn enrich(
        &self,
        keyword: &str,
        results: &[SearchResult],
        report: &mut Report,
    ) -> eyre::Result<Result<Enrichment, SkipReason>> {
        let (video_ids, channel_ids) = usable_ids(results);
        if video_ids.is_empty() || channel_ids.is_empty() {
            report.warning(format!(
                "Skipping keyword: {keyword} due to missing video/channel data."
            ));
            return Ok(Err(SkipReason::MissingIds));
        }

        let fetched = self
            .client
            .list_video_statistics(&video_ids)
            .await
            .with_context(|| format!("fetch video statistics for {keyword:?}"))?;
        let videos: Vec<VideoStats> = match fetched.into_data() {
            Ok(response) => response.items.into_iter().map(VideoStats::from).collect(),
            Err(failure) => {
                return Ok(Err(report_failure(
                    keyword,
                    "video statistics",
                    "Video stats API error",
                    failure,
                    report,
                )));
            }
        };
        if videos.is_empty() {
            report.warning(format!(
                "Failed to fetch video statistics for keyword: {keyword}"
            ));
            return Ok(Err(SkipReason::NoVideoStats));
        }

        let fetched = self
            .client
            .list_channel_statistics(&channel_ids)
            .await
            .with_context(|| format!("fetch channel statistics for {keyword:?}"))?;
        let channels: Vec<ChannelStats> = match fetched.into_data() {
            Ok(response) => response
                .items
                .into_iter()
                .map(ChannelStats::from)
                .collect(),
            Err(failure) => {
                return Ok(Err(report_failure(
                    keyword,
                    "channel statistics",
                    "Channel stats API error",
                    failure,
                    report,
                )));
            }
        };
        if channels.is_empty() {
            report.warning(format!(
                "Failed to fetch channel statistics for keyword: {keyword}"
            ));
            return Ok(Err(SkipReason::NoChannelStats));
        }

        Ok(Ok(Enrichment { videos, channels }))
    }
}

/// Video and channel ids to look up, with missing ones left out.
pub fn usable_ids(results: &[SearchResult]) -> (Vec<&str>, Vec<&str>) {
    let video_ids = results
        .iter()
        .filter_map(|r| r.video_id.as_deref())
        .collect();
    let channel_ids = results
        .iter()
        .filter_map(|r| r.channel_id.as_deref())
        .collect();
    (video_ids, channel_ids)
}

/// FilterAndPresent: joins results and statistics by position and keeps small channels.
///
/// The join is positional: the n-th search result is paired with the n-th video and the n-th
/// channel returned by the statistics calls. Disagreements are logged but not corrected.
pub fn filter_records(results: &[SearchResult], enrichment: &Enrichment) -> Vec<ResultRecord> {
    let Enrichment { videos, channels } = enrichment;
    if results.len() != videos.len() || results.len() != channels.len() {
        tracing::warn!(
            results = results.len(),
            videos = videos.len(),
            channels = channels.len(),
            "result and statistics lists differ in length; joining by position anyway"
        );
    }

    let mut records = Vec::new();
    for ((result, video), channel) in results.iter().zip(videos).zip(channels) {
        let Some(video_id) = result.video_id.as_deref() else {
            continue;
        };
        if video_id != video.video_id {
            tracing::warn!(
                video_id,
                stats_video_id = video.video_id,
                "video statistics are not aligned with search results"
            );
        }
        if result.channel_id.as_deref() != Some(channel.channel_id.as_str()) {
            tracing::warn!(
                channel_id = ?result.channel_id,
                stats_channel_id = channel.channel_id,
                "channel statistics are not aligned with search results"
            );
        }

        if channel.subscriber_count < SUBSCRIBER_LIMIT {
            records.push(ResultRecord::new(
                result.title.clone(),
                &result.description,
                video_id,
                video.view_count,
                channel.subscriber_count,
            ));
        }
    }
    records
}

/// Renders the run-wide results after the last keyword.
pub fn render_results(records: &[ResultRecord], report: &mut Report) {
    if records.is_empty() {
        report.warning("No results found for channels with fewer than 3,000 subscribers.");
        return;
    }

    report.success(format!(
        "Found {} results across all keywords!",
        records.len()
    ));
    for record in records {
        report.record(record.clone());
        report.divider();
    }
}

/// Tells the user why a call produced no data and picks the matching [`SkipReason`].
fn report_failure(
    keyword: &str,
    stage: &str,
    label: &str,
    failure: Fetched<Infallible>,
    report: &mut Report,
) -> SkipReason {
    match failure {
        Fetched::Forbidden { body } => {
            report.error(format!("{label}: 403 Forbidden - {body}"));
            SkipReason::Forbidden
        }
        Fetched::GaveUp {
            attempts,
            last_failure,
        } => {
            report.warning(format!(
                "No data for keyword: {keyword} ({stage} request failed after {attempts} attempts: {last_failure})"
            ));
            SkipReason::Unavailable
        }
        Fetched::Data(never) => match never {},
    }
}
