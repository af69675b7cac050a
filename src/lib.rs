//! Bundestag Plenarprotokoll Crawler Library
//!
//! This library crawls the Bundestag Open Data listing page, classifies
//! discovered document links by legislative period (Wahlperiode), and
//! downloads the referenced files into a period-partitioned directory
//! tree, skipping files that are already present.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Crawl configuration (base URL, download directory, delay)
//! - [`classify`] - Legislative-period classification of document links
//! - [`download`] - Streaming transport and file download
//! - [`crawl`] - The crawl orchestrator
//!
//! The pipeline is strictly sequential: one listing fetch, then one
//! download at a time, with a fixed courtesy delay between downloads.
//! The filesystem is the only durable state; re-running the crawler is
//! the sole recovery mechanism.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod config;
pub mod crawl;
pub mod download;

// Re-export commonly used types
pub use classify::{UNKNOWN_BUCKET, classify};
pub use config::CrawlConfig;
pub use crawl::{CrawlError, CrawlStats, Crawler};
pub use download::{
    DownloadError, FetchedBody, HttpTransport, NoProgress, ProgressSink, Transport,
    download_to_path, ensure_directory,
};
