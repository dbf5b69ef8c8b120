use clap::Parser;
use eyre::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use youtube_viral_topics::config::Config;
use youtube_viral_topics::keywords::default_keywords;
use youtube_viral_topics::pipeline::QueryPipeline;
use youtube_viral_topics::server::{self, App};

/// Serve the YouTube Viral Topics page.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "VIRAL_TOPICS_ADDR", default_value = "127.0.0.1:8501")]
    bind: SocketAddr,

    /// Do not open the page in a browser on startup.
    #[arg(long)]
    no_browser: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    youtube_viral_topics::init_tracing();
    let args = Args::parse();

    let config = Config::from_env().context("load configuration")?;
    let client = youtube_viral_topics::youtube_client(&config)?;
    tracing::debug!(base_url = client.base_url(), "using YouTube API");
    let pipeline = QueryPipeline::new(client, default_keywords());

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("bind to {}", args.bind))?;
    let addr = listener.local_addr().context("get local address")?;
    let url = format!("http://{addr}/");
    tracing::info!(%url, keywords = pipeline.keywords().len(), "serving viral topics page");

    if !args.no_browser {
        if let Err(e) = webbrowser::open(&url) {
            tracing::warn!("could not open browser, visit {url} manually: {e}");
        }
    }

    server::serve(listener, Arc::new(App::new(pipeline))).await
}
