//! Error types for the download module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching or writing a file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS
    /// errors, mid-stream body failures).
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error during download (create directory, create
    /// file, write, flush).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The response body was not valid UTF-8 where text was expected.
    #[error("response body from {url} is not valid UTF-8")]
    InvalidBody {
        /// The URL whose body failed to decode.
        url: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid body error.
    pub fn invalid_body(url: impl Into<String>) -> Self {
        Self::InvalidBody { url: url.into() }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>` impls: the variants
// need context (url, path) the source errors cannot supply, so callers
// go through the helper constructors.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_names_url() {
        let error = DownloadError::timeout("https://example.com/pp19.xml");
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("https://example.com/pp19.xml"));
    }

    #[test]
    fn test_http_status_display_names_status_and_url() {
        let error = DownloadError::http_status("https://example.com/pp19.xml", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(
            msg.contains("https://example.com/pp19.xml"),
            "Expected URL in: {msg}"
        );
    }

    #[test]
    fn test_io_display_names_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::io(PathBuf::from("/tmp/pp19.xml"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/pp19.xml"), "Expected path in: {msg}");
    }

    #[test]
    fn test_invalid_url_display() {
        let error = DownloadError::invalid_url("not-a-url");
        let msg = error.to_string();
        assert!(msg.contains("invalid URL"), "Expected 'invalid URL' in: {msg}");
        assert!(msg.contains("not-a-url"), "Expected URL in: {msg}");
    }
}
