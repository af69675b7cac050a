//! Streaming transport and file download.
//!
//! This module provides the network-facing half of the pipeline: the
//! [`Transport`] trait abstracts "GET a URL, stream the body" so tests
//! can substitute an in-memory transport with controlled chunking and
//! induced failures; [`HttpTransport`] is the reqwest-backed production
//! implementation; [`download_to_path`] drives a transport and writes
//! the streamed bytes to disk.

mod downloader;
mod error;
mod transport;

pub use downloader::{NoProgress, ProgressSink, download_to_path, ensure_directory};
pub use error::DownloadError;
pub use transport::{ByteStream, FetchedBody, HttpTransport, Transport, collect_utf8};
