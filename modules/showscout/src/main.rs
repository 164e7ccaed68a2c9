use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use showscout::pipeline;
use showscout::renderer::{BrowserlessRenderer, PageRenderer};
use showscout_core::Config;

#[derive(Parser)]
#[command(
    name = "showscout",
    about = "Scrapes upcoming livestream shows into a JSON schedule feed"
)]
struct Args {
    /// Scrape one curated seller page instead of running listing searches
    #[arg(long)]
    seller_url: Option<String>,

    /// Search phrase (repeatable; replaces the configured query set)
    #[arg(long = "query")]
    queries: Vec<String>,

    /// Max detail pages enriched per target
    #[arg(long)]
    max: Option<usize>,

    /// Output directory for the feed and debug artifacts
    #[arg(long)]
    out_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("showscout=info".parse()?))
        .init();

    info!("ShowScout starting...");

    let args = Args::parse();
    let mut config = Config::from_env();
    if args.seller_url.is_some() {
        config.seller_url = args.seller_url;
    }
    if !args.queries.is_empty() {
        config.queries = args.queries;
    }
    if let Some(max) = args.max {
        config.max_enrich = max;
    }
    if let Some(out_dir) = args.out_dir {
        config.output_dir = out_dir;
    }
    config.log_redacted();

    let renderer: Arc<dyn PageRenderer> = Arc::new(BrowserlessRenderer::new(
        &config.browserless_url,
        config.browserless_token.as_deref(),
    ));

    pipeline::run_and_publish(Arc::new(config), renderer).await;

    info!("ShowScout run complete");
    Ok(())
}
