//! Crawl configuration.
//!
//! The crawler historically ran against fixed constants. They live in an
//! explicit [`CrawlConfig`] so tests can point the crawler at a mock
//! server and a temporary directory; the binary always uses the
//! production defaults and exposes none of these as flags.

use std::path::PathBuf;
use std::time::Duration;

/// Base URL of the Bundestag site, used to resolve relative hrefs.
pub const BASE_URL: &str = "https://www.bundestag.de";

/// Path of the Open Data listing page, relative to the base URL.
pub const LISTING_PATH: &str = "/services/opendata";

/// Default directory the downloaded protocols are organized under.
pub const DOWNLOAD_DIR: &str = "bundestag_plenarprotokolle";

/// Courtesy pause between successive downloads.
pub const REQUEST_DELAY: Duration = Duration::from_secs(1);

/// File extensions of qualifying document links. Anything else is
/// silently skipped during link enumeration.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = [".xml", ".zip"];

/// Settings for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Site origin; relative hrefs are resolved against this.
    pub base_url: String,
    /// Absolute URL of the listing page to crawl.
    pub listing_url: String,
    /// Root of the period-partitioned download tree.
    pub download_dir: PathBuf,
    /// Sleep after each successful download.
    pub request_delay: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            listing_url: format!("{BASE_URL}{LISTING_PATH}"),
            download_dir: PathBuf::from(DOWNLOAD_DIR),
            request_delay: REQUEST_DELAY,
        }
    }
}

impl CrawlConfig {
    /// Creates a config rooted at a custom origin and download directory.
    ///
    /// The listing URL is derived from the origin and the fixed listing
    /// path. Mainly useful for tests running against a local mock server.
    #[must_use]
    pub fn for_origin(base_url: impl Into<String>, download_dir: impl Into<PathBuf>) -> Self {
        let base_url = base_url.into();
        Self {
            listing_url: format!("{base_url}{LISTING_PATH}"),
            base_url,
            download_dir: download_dir.into(),
            request_delay: REQUEST_DELAY,
        }
    }

    /// Resolves a discovered href to an absolute URL.
    ///
    /// Absolute hrefs pass through unchanged; site-relative hrefs are
    /// prefixed with the configured base URL.
    #[must_use]
    pub fn resolve_url(&self, href: &str) -> String {
        if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{}{href}", self.base_url)
        }
    }

    /// Whether an href points at a qualifying document file.
    #[must_use]
    pub fn accepts(href: &str) -> bool {
        ACCEPTED_EXTENSIONS.iter().any(|ext| href.ends_with(ext))
    }
}
