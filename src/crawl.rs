//! The crawl orchestrator.
//!
//! One [`Crawler::run`] call is one complete crawl: fetch the listing
//! page, enumerate qualifying document links in document order, and for
//! each link ensure its period bucket directory, skip it when the
//! destination file already exists, or download it with a fixed
//! courtesy delay afterwards.
//!
//! # Failure model
//!
//! Only two failures abort a run: the listing page fetch and creating
//! the base download directory. Every per-link failure is logged,
//! counted, and isolated; the crawl always proceeds to the next link.
//! There is no state across runs. Re-running the crawler is the
//! recovery mechanism, with the existence check providing idempotence.

use std::sync::Arc;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{info, instrument, warn};

use crate::classify::classify;
use crate::config::CrawlConfig;
use crate::download::{
    DownloadError, ProgressSink, Transport, collect_utf8, download_to_path, ensure_directory,
};

/// Selector for document links on the listing page. Only anchors
/// carrying the document marker class and an href qualify.
#[allow(clippy::expect_used)]
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a.bt-link-dokument[href]").expect("link selector is valid")
});

/// Errors that abort a whole crawl run.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// The base download directory could not be created.
    #[error("failed to prepare download directory: {source}")]
    Setup {
        /// The underlying failure.
        #[source]
        source: DownloadError,
    },

    /// The listing page could not be fetched or read.
    #[error("failed to fetch listing page: {source}")]
    Listing {
        /// The underlying failure.
        #[source]
        source: DownloadError,
    },
}

/// Counters for one crawl run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    downloaded: usize,
    skipped: usize,
    failed: usize,
}

impl CrawlStats {
    /// Number of files downloaded this run.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.downloaded
    }

    /// Number of links skipped because the destination already existed.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of links that failed and were passed over.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Total number of links processed (downloaded + skipped + failed).
    #[must_use]
    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }
}

/// A discovered document link, reduced to what the download loop needs.
/// The parsed page tree is discarded once these are built.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LinkRecord {
    href: String,
    bucket: String,
}

/// Outcome of processing a single link.
enum LinkOutcome {
    Downloaded,
    Skipped,
}

/// Sequential crawl-then-download pipeline.
///
/// The crawler owns no state beyond its configuration; the filesystem
/// under `download_dir` is the de facto ledger of completed downloads.
pub struct Crawler {
    config: CrawlConfig,
    transport: Arc<dyn Transport>,
    progress: Arc<dyn ProgressSink>,
}

impl Crawler {
    /// Creates a crawler over the given transport and progress sink.
    #[must_use]
    pub fn new(
        config: CrawlConfig,
        transport: Arc<dyn Transport>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            config,
            transport,
            progress,
        }
    }

    /// Runs one complete crawl.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Setup`] if the base download directory
    /// cannot be created and [`CrawlError::Listing`] if the listing
    /// page cannot be fetched or read. Per-link failures never surface
    /// here; they are logged and reflected in the returned stats.
    #[instrument(skip(self), fields(listing = %self.config.listing_url))]
    pub async fn run(&self) -> Result<CrawlStats, CrawlError> {
        ensure_directory(&self.config.download_dir)
            .await
            .map_err(|source| CrawlError::Setup { source })?;

        let body = self.fetch_listing().await?;
        let records = enumerate_links(&body);
        info!(links = records.len(), "listing page enumerated");

        let mut stats = CrawlStats::default();
        for record in &records {
            match self.process_link(record).await {
                Ok(LinkOutcome::Downloaded) => {
                    stats.downloaded += 1;
                    // Courtesy pause between downloads.
                    tokio::time::sleep(self.config.request_delay).await;
                }
                Ok(LinkOutcome::Skipped) => stats.skipped += 1,
                Err(error) => {
                    warn!(href = %record.href, error = %error, "failed to download, continuing");
                    stats.failed += 1;
                }
            }
        }

        info!(
            downloaded = stats.downloaded(),
            skipped = stats.skipped(),
            failed = stats.failed(),
            "crawl complete"
        );
        Ok(stats)
    }

    async fn fetch_listing(&self) -> Result<String, CrawlError> {
        let url = &self.config.listing_url;
        let fetched = self
            .transport
            .fetch_stream(url)
            .await
            .map_err(|source| CrawlError::Listing { source })?;
        collect_utf8(fetched, url)
            .await
            .map_err(|source| CrawlError::Listing { source })
    }

    /// Processes one link: bucket directory, existence check, download.
    async fn process_link(&self, record: &LinkRecord) -> Result<LinkOutcome, DownloadError> {
        let bucket_dir = self.config.download_dir.join(&record.bucket);
        ensure_directory(&bucket_dir).await?;

        let url = self.config.resolve_url(&record.href);
        let file_name = basename(&record.href);
        let dest = bucket_dir.join(file_name);

        if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
            info!(file = %file_name, "skipping, already downloaded");
            return Ok(LinkOutcome::Skipped);
        }

        info!(file = %file_name, bucket = %record.bucket, "downloading");
        download_to_path(self.transport.as_ref(), &url, &dest, self.progress.as_ref()).await?;
        Ok(LinkOutcome::Downloaded)
    }
}

/// Enumerates qualifying document links from the listing page body.
///
/// Links are returned in document order, already filtered to accepted
/// extensions and classified into their period buckets. Parsing and
/// classification happen entirely here so the non-`Send` page tree is
/// dropped before the download loop awaits anything.
fn enumerate_links(body: &str) -> Vec<LinkRecord> {
    let document = Html::parse_document(body);
    document
        .select(&LINK_SELECTOR)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            if !CrawlConfig::accepts(href) {
                return None;
            }
            Some(LinkRecord {
                href: href.to_string(),
                bucket: classify(link),
            })
        })
        .collect()
}

/// Final path segment of an href, used as the destination file name.
fn basename(href: &str) -> &str {
    href.rsplit('/').next().unwrap_or(href)
}
