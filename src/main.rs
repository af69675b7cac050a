//! CLI entry point for the Bundestag protocol crawler.

use std::sync::Arc;

use anyhow::Result;
use btscrape::{CrawlConfig, Crawler, HttpTransport};
use clap::Parser;
use tracing::{debug, info};

mod cli;
mod progress;

use cli::Args;
use progress::BarProgress;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let config = CrawlConfig::default();
    info!(
        listing = %config.listing_url,
        dir = %config.download_dir.display(),
        "crawl starting"
    );

    let crawler = Crawler::new(
        config,
        Arc::new(HttpTransport::new()),
        Arc::new(BarProgress::new()),
    );

    let stats = crawler.run().await?;

    info!(
        downloaded = stats.downloaded(),
        skipped = stats.skipped(),
        failed = stats.failed(),
        total = stats.total(),
        "Download completed"
    );

    Ok(())
}
