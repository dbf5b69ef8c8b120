use mockito::{Matcher, Mock, Server, ServerGuard};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::time::Duration;
use youtube_viral_topics::pipeline::{DaysToSearch, KeywordOutcome, QueryPipeline, SkipReason};
use youtube_viral_topics::report::{Block, Report};
use youtube_viral_topics::youtube_api::{RetryPolicy, YouTubeClient};

fn client(server: &ServerGuard) -> YouTubeClient {
    YouTubeClient::new("test-key", server.url(), reqwest::Client::new()).with_retry_policy(
        RetryPolicy {
            max_attempts: 3,
            pause: Duration::ZERO,
        },
    )
}

fn pipeline(server: &ServerGuard, keywords: &[&str]) -> QueryPipeline {
    QueryPipeline::new(
        client(server),
        keywords.iter().map(|k| k.to_string()).collect(),
    )
}

/// `(video id, channel id, title)`; `None` leaves the id out of the item.
fn search_body(items: &[(Option<&str>, Option<&str>, &str)]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|&(video_id, channel_id, title)| {
            let mut id = json!({"kind": "youtube#video"});
            if let Some(video_id) = video_id {
                id["videoId"] = json!(video_id);
            }
            let mut snippet = json!({
                "title": title,
                "description": format!("About {title}"),
            });
            if let Some(channel_id) = channel_id {
                snippet["channelId"] = json!(channel_id);
            }
            json!({"kind": "youtube#searchResult", "id": id, "snippet": snippet})
        })
        .collect();
    json!({
        "kind": "youtube#searchListResponse",
        "pageInfo": {"totalResults": items.len(), "resultsPerPage": 5},
        "items": items,
    })
}

fn videos_body(items: &[(&str, u64)]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|&(id, views)| json!({"id": id, "statistics": {"viewCount": views.to_string()}}))
        .collect();
    json!({"kind": "youtube#videoListResponse", "items": items})
}

fn channels_body(items: &[(&str, u64)]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|&(id, subs)| {
            json!({
                "id": id,
                "statistics": {"subscriberCount": subs.to_string(), "hiddenSubscriberCount": false},
            })
        })
        .collect();
    json!({"kind": "youtube#channelListResponse", "items": items})
}

/// Whether any message block of `report` contains `needle`.
fn mentions(report: &Report, needle: &str) -> bool {
    report.blocks().iter().any(|block| match block {
        Block::Text(m) | Block::Success(m) | Block::Warning(m) | Block::Error(m) => {
            m.contains(needle)
        }
        Block::Record(_) | Block::Divider => false,
    })
}

async fn mock_search(server: &mut ServerGuard, keyword: &str, status: usize, body: String) -> Mock {
    server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("q".into(), keyword.into()))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

async fn mock_json(server: &mut ServerGuard, path: &str, ids: &str, body: Value) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("part".into(), "statistics".into()),
            Matcher::UrlEncoded("id".into(), ids.into()),
            Matcher::UrlEncoded("key".into(), "test-key".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn keeps_only_videos_from_small_channels() {
    let mut server = Server::new_async().await;
    let search = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("part".into(), "snippet".into()),
            Matcher::UrlEncoded("q".into(), "Reddit Update".into()),
            Matcher::UrlEncoded("type".into(), "video".into()),
            Matcher::UrlEncoded("order".into(), "viewCount".into()),
            Matcher::UrlEncoded("maxResults".into(), "5".into()),
            Matcher::UrlEncoded("key".into(), "test-key".into()),
            Matcher::Regex(r"publishedAfter=\d{4}-\d{2}-\d{2}T\d{2}%3A\d{2}%3A\d{2}Z".into()),
        ]))
        .with_status(200)
        .with_body(
            search_body(&[
                (Some("v1"), Some("c1"), "Small channel"),
                (Some("v2"), Some("c2"), "Big channel"),
            ])
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let videos = mock_json(
        &mut server,
        "/videos",
        "v1,v2",
        videos_body(&[("v1", 900), ("v2", 50_000)]),
    )
    .await;
    let channels = mock_json(
        &mut server,
        "/channels",
        "c1,c2",
        channels_body(&[("c1", 1500), ("c2", 5000)]),
    )
    .await;

    let mut report = Report::new();
    let summary = pipeline(&server, &["Reddit Update"])
        .run(DaysToSearch::new(5).unwrap(), &mut report)
        .await
        .unwrap();

    search.assert_async().await;
    videos.assert_async().await;
    channels.assert_async().await;

    assert_eq!(summary.records.len(), 1);
    let record = &summary.records[0];
    assert_eq!(record.title, "Small channel");
    assert_eq!(record.description, "About Small channel");
    assert_eq!(record.url, "https://www.youtube.com/watch?v=v1");
    assert_eq!(record.views, 900);
    assert_eq!(record.subscribers, 1500);
    assert_eq!(
        summary.outcomes,
        [("Reddit Update".to_string(), KeywordOutcome::Collected(1))]
    );

    assert_eq!(
        report.blocks(),
        [
            Block::Text("Searching for keyword: Reddit Update".to_string()),
            Block::Success("Found 1 results across all keywords!".to_string()),
            Block::Record(record.clone()),
            Block::Divider,
        ]
    );
}

#[tokio::test]
async fn empty_search_moves_on_to_next_keyword() {
    let mut server = Server::new_async().await;
    let _empty = mock_search(&mut server, "nothing", 200, search_body(&[]).to_string()).await;
    let _found = mock_search(
        &mut server,
        "something",
        200,
        search_body(&[(Some("v1"), Some("c1"), "Found it")]).to_string(),
    )
    .await;
    let _videos = mock_json(&mut server, "/videos", "v1", videos_body(&[("v1", 10)])).await;
    let _channels = mock_json(&mut server, "/channels", "c1", channels_body(&[("c1", 10)])).await;

    let mut report = Report::new();
    let summary = pipeline(&server, &["nothing", "something"])
        .run(DaysToSearch::default(), &mut report)
        .await
        .unwrap();

    assert_eq!(
        summary.outcomes,
        [
            (
                "nothing".to_string(),
                KeywordOutcome::Skipped(SkipReason::NoVideos)
            ),
            ("something".to_string(), KeywordOutcome::Collected(1)),
        ]
    );
    assert!(mentions(&report, "No videos found for keyword: nothing"));
    assert_eq!(summary.records.len(), 1);
    assert_eq!(summary.records[0].title, "Found it");
}

#[tokio::test]
async fn zero_results_overall_show_single_notice() {
    let mut server = Server::new_async().await;
    let _empty = mock_search(&mut server, "nothing", 200, json!({}).to_string()).await;

    let mut report = Report::new();
    let summary = pipeline(&server, &["nothing"])
        .run(DaysToSearch::default(), &mut report)
        .await
        .unwrap();

    assert!(summary.records.is_empty());
    assert_eq!(
        report.blocks(),
        [
            Block::Text("Searching for keyword: nothing".to_string()),
            Block::Warning("No videos found for keyword: nothing".to_string()),
            Block::Warning(
                "No results found for channels with fewer than 3,000 subscribers.".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn failures_are_isolated_to_their_keyword() {
    let mut server = Server::new_async().await;
    let forbidden = server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("q".into(), "quota".into()))
        .with_status(403)
        .with_body(r#"{"error": {"code": 403, "message": "quotaExceeded"}}"#)
        .expect(1)
        .create_async()
        .await;
    let flaky = server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("q".into(), "flaky".into()))
        .with_status(500)
        .with_body("backend error")
        .expect(3)
        .create_async()
        .await;
    let _garbled = mock_search(&mut server, "garbled", 200, "this is not json".to_string()).await;
    let _fine = mock_search(
        &mut server,
        "fine",
        200,
        search_body(&[(Some("v1"), Some("c1"), "Still here")]).to_string(),
    )
    .await;
    let _videos = mock_json(&mut server, "/videos", "v1", videos_body(&[("v1", 10)])).await;
    let _channels = mock_json(&mut server, "/channels", "c1", channels_body(&[("c1", 10)])).await;

    let mut report = Report::new();
    let summary = pipeline(&server, &["quota", "flaky", "garbled", "fine"])
        .run(DaysToSearch::default(), &mut report)
        .await
        .unwrap();

    forbidden.assert_async().await;
    flaky.assert_async().await;

    assert_eq!(
        summary.outcomes,
        [
            (
                "quota".to_string(),
                KeywordOutcome::Skipped(SkipReason::Forbidden)
            ),
            (
                "flaky".to_string(),
                KeywordOutcome::Skipped(SkipReason::Unavailable)
            ),
            (
                "garbled".to_string(),
                KeywordOutcome::Skipped(SkipReason::Failed)
            ),
            ("fine".to_string(), KeywordOutcome::Collected(1)),
        ]
    );
    assert!(mentions(&report, "API error: 403 Forbidden"));
    assert!(mentions(
        &report,
        "No data for keyword: flaky (search request failed after 3 attempts"
    ));
    assert!(mentions(&report, "Error while processing keyword garbled"));
    assert_eq!(summary.records.len(), 1);
}

#[tokio::test]
async fn results_without_ids_skip_enrichment() {
    let mut server = Server::new_async().await;
    let _search = mock_search(
        &mut server,
        "anonymous",
        200,
        search_body(&[(None, Some("c1"), "No video id"), (None, None, "Nothing")]).to_string(),
    )
    .await;
    let videos = server
        .mock("GET", "/videos")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let channels = server
        .mock("GET", "/channels")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut report = Report::new();
    let summary = pipeline(&server, &["anonymous"])
        .run(DaysToSearch::default(), &mut report)
        .await
        .unwrap();

    videos.assert_async().await;
    channels.assert_async().await;
    assert_eq!(
        summary.outcomes,
        [(
            "anonymous".to_string(),
            KeywordOutcome::Skipped(SkipReason::MissingIds)
        )]
    );
    assert!(mentions(&report, "Skipping keyword: anonymous due to missing video/channel data."));
}

#[tokio::test]
async fn missing_ids_are_left_out_of_batched_lookups() {
    let mut server = Server::new_async().await;
    let _search = mock_search(
        &mut server,
        "mixed",
        200,
        search_body(&[
            (Some("v1"), Some("c1"), "Complete"),
            (None, Some("c2"), "No video id"),
            (Some("v3"), None, "No channel id"),
        ])
        .to_string(),
    )
    .await;
    let videos = mock_json(
        &mut server,
        "/videos",
        "v1,v3",
        videos_body(&[("v1", 1), ("v3", 3)]),
    )
    .await;
    let channels = mock_json(
        &mut server,
        "/channels",
        "c1,c2",
        channels_body(&[("c1", 10), ("c2", 20)]),
    )
    .await;

    let mut report = Report::new();
    let summary = pipeline(&server, &["mixed"])
        .run(DaysToSearch::default(), &mut report)
        .await
        .unwrap();

    videos.assert_async().await;
    channels.assert_async().await;
    // positional join: only the first result has both a video id and a stats row
    let titles: Vec<_> = summary.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Complete"]);
}

#[tokio::test]
async fn empty_statistics_skip_the_keyword() {
    let mut server = Server::new_async().await;
    let _search = mock_search(
        &mut server,
        "private",
        200,
        search_body(&[(Some("v1"), Some("c1"), "Gone")]).to_string(),
    )
    .await;
    let _videos = mock_json(&mut server, "/videos", "v1", videos_body(&[])).await;
    let channels = server
        .mock("GET", "/channels")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut report = Report::new();
    let summary = pipeline(&server, &["private"])
        .run(DaysToSearch::default(), &mut report)
        .await
        .unwrap();

    channels.assert_async().await;
    assert_eq!(
        summary.outcomes,
        [(
            "private".to_string(),
            KeywordOutcome::Skipped(SkipReason::NoVideoStats)
        )]
    );
    assert!(mentions(&report, "Failed to fetch video statistics for keyword: private"));
}

#[tokio::test]
async fn forbidden_channel_lookup_is_reported() {
    let mut server = Server::new_async().await;
    let _search = mock_search(
        &mut server,
        "quota",
        200,
        search_body(&[(Some("v1"), Some("c1"), "Video")]).to_string(),
    )
    .await;
    let _videos = mock_json(&mut server, "/videos", "v1", videos_body(&[("v1", 1)])).await;
    let channels = server
        .mock("GET", "/channels")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body("quotaExceeded")
        .expect(1)
        .create_async()
        .await;

    let mut report = Report::new();
    let summary = pipeline(&server, &["quota"])
        .run(DaysToSearch::default(), &mut report)
        .await
        .unwrap();

    channels.assert_async().await;
    assert_eq!(
        summary.outcomes,
        [(
            "quota".to_string(),
            KeywordOutcome::Skipped(SkipReason::Forbidden)
        )]
    );
    assert!(mentions(&report, "Channel stats API error: 403 Forbidden - quotaExceeded"));
}

#[tokio::test]
async fn empty_channel_statistics_skip_only_that_keyword() {
    let mut server = Server::new_async().await;
    let _gone = mock_search(
        &mut server,
        "gone",
        200,
        search_body(&[(Some("v1"), Some("c1"), "Terminated channel")]).to_string(),
    )
    .await;
    let _next = mock_search(
        &mut server,
        "next",
        200,
        search_body(&[(Some("v2"), Some("c2"), "Still around")]).to_string(),
    )
    .await;
    let _videos_gone = mock_json(&mut server, "/videos", "v1", videos_body(&[("v1", 5)])).await;
    let _videos_next = mock_json(&mut server, "/videos", "v2", videos_body(&[("v2", 7)])).await;
    let _channels_gone = mock_json(&mut server, "/channels", "c1", json!({"items": []})).await;
    let _channels_next =
        mock_json(&mut server, "/channels", "c2", channels_body(&[("c2", 42)])).await;

    let mut report = Report::new();
    let summary = pipeline(&server, &["gone", "next"])
        .run(DaysToSearch::default(), &mut report)
        .await
        .unwrap();

    assert_eq!(
        summary.outcomes,
        [
            (
                "gone".to_string(),
                KeywordOutcome::Skipped(SkipReason::NoChannelStats)
            ),
            ("next".to_string(), KeywordOutcome::Collected(1)),
        ]
    );
    assert!(mentions(
        &report,
        "Failed to fetch channel statistics for keyword: gone"
    ));
    assert_eq!(summary.records.len(), 1);
    assert_eq!(summary.records[0].title, "Still around");
    assert_eq!(summary.records[0].subscribers, 42);
}

#[tokio::test]
async fn failing_video_lookup_gives_up_after_three_attempts() {
    let mut server = Server::new_async().await;
    let _search = mock_search(
        &mut server,
        "outage",
        200,
        search_body(&[(Some("v1"), Some("c1"), "Unlucky")]).to_string(),
    )
    .await;
    let videos = server
        .mock("GET", "/videos")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("backend error")
        .expect(3)
        .create_async()
        .await;
    let channels = server
        .mock("GET", "/channels")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut report = Report::new();
    let summary = pipeline(&server, &["outage"])
        .run(DaysToSearch::default(), &mut report)
        .await
        .unwrap();

    videos.assert_async().await;
    channels.assert_async().await;
    assert_eq!(
        summary.outcomes,
        [(
            "outage".to_string(),
            KeywordOutcome::Skipped(SkipReason::Unavailable)
        )]
    );
    assert!(mentions(
        &report,
        "No data for keyword: outage (video statistics request failed after 3 attempts: 500 Internal Server Error - backend error)"
    ));
    assert!(summary.records.is_empty());
}
