use clap::Parser;
use eyre::Context;
use youtube_viral_topics::config::Config;
use youtube_viral_topics::keywords::default_keywords;
use youtube_viral_topics::pipeline::{DaysToSearch, QueryPipeline};
use youtube_viral_topics::report::Report;

/// Run the viral topics search once and print the results as markdown.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// How many days back to search (1-30).
    #[arg(long, default_value_t = DaysToSearch::default())]
    days: DaysToSearch,

    /// Search only for this phrase instead of the built-in list. May be repeated.
    #[arg(long = "keyword", value_name = "PHRASE")]
    keywords: Vec<String>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    youtube_viral_topics::init_tracing();
    let args = Args::parse();

    let config = Config::from_env().context("load configuration")?;
    let client = youtube_viral_topics::youtube_client(&config)?;
    let keywords = if args.keywords.is_empty() {
        default_keywords()
    } else {
        args.keywords
    };
    let pipeline = QueryPipeline::new(client, keywords);

    let mut report = Report::new();
    if let Err(e) = pipeline.run(args.days, &mut report).await {
        tracing::error!("run failed: {e:?}");
        report.error(format!("An error occurred: {e:#}"));
    }
    print!("{report}");

    Ok(())
}
