//! Finds fast-growing videos from small YouTube channels.
//!
//! For every keyword in [`keywords::KEYWORDS`], the [`pipeline::QueryPipeline`] searches for the
//! most viewed videos of the last few days, looks up their view and subscriber counts, and keeps
//! the ones whose channel has fewer than [`pipeline::SUBSCRIBER_LIMIT`] subscribers. The outcome
//! of a run is a [`report::Report`], shown either on the web page served by [`server`] or on the
//! terminal.

pub mod config;
pub mod keywords;
pub mod pipeline;
pub mod report;
pub mod server;
pub mod youtube_api;

use crate::config::Config;
use crate::youtube_api::YouTubeClient;
use eyre::Context;
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber writing to stderr.
///
/// Defaults to `info`; `RUST_LOG` overrides it.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

/// Builds the API client described by `config`.
pub fn youtube_client(config: &Config) -> eyre::Result<YouTubeClient> {
    let http_client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("build HTTP client")?;
    Ok(YouTubeClient::new(
        config.api_key.clone(),
        config.api_base_url.clone(),
        http_client,
    ))
}
