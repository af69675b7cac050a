//! Writes streamed bodies to disk.

use std::path::Path;

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

use super::error::DownloadError;
use super::transport::Transport;

/// Observes download progress.
///
/// The downloader reports progress as a side effect; it is not part of
/// the return contract. The binary plugs in an indicatif progress bar,
/// the library default is [`NoProgress`].
pub trait ProgressSink: Send + Sync {
    /// A download is starting. `total_bytes` is 0 when unknown.
    fn begin(&self, name: &str, total_bytes: u64);
    /// Another chunk of `bytes` has been written.
    fn advance(&self, bytes: u64);
    /// The current download finished (successfully or not).
    fn finish(&self);
}

/// No-op progress sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn begin(&self, _name: &str, _total_bytes: u64) {}
    fn advance(&self, _bytes: u64) {}
    fn finish(&self) {}
}

/// Creates `path` and all missing parent segments.
///
/// A no-op when the directory already exists.
///
/// # Errors
///
/// Returns `DownloadError::Io` if the path is invalid or permissions
/// are insufficient.
pub async fn ensure_directory(path: &Path) -> Result<(), DownloadError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| DownloadError::io(path, e))
}

/// Downloads `url` to `dest`, streaming chunks as they arrive.
///
/// The destination is truncated first: there are no resume semantics,
/// every invocation starts from byte zero. On success the file is fully
/// written and flushed and the byte count is returned. On a mid-stream
/// network or IO failure the partially written file is left on disk and
/// the error propagates; the caller decides disposition.
///
/// # Errors
///
/// Returns `DownloadError` on fetch failure, a failing chunk, or any
/// filesystem error while creating or writing the destination.
#[instrument(skip(transport, progress), fields(url = %url))]
pub async fn download_to_path(
    transport: &dyn Transport,
    url: &str,
    dest: &Path,
    progress: &dyn ProgressSink,
) -> Result<u64, DownloadError> {
    let body = transport.fetch_stream(url).await?;

    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| url.to_string());
    progress.begin(&name, body.total_size);

    let file = File::create(dest)
        .await
        .map_err(|e| DownloadError::io(dest, e))?;
    let mut writer = BufWriter::new(file);
    let mut stream = body.stream;
    let mut bytes_written: u64 = 0;

    let outcome = async {
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| DownloadError::io(dest, e))?;
            bytes_written += chunk.len() as u64;
            progress.advance(chunk.len() as u64);
        }
        // Ensure all data is flushed to disk before reporting completion.
        writer.flush().await.map_err(|e| DownloadError::io(dest, e))
    }
    .await;

    progress.finish();

    match outcome {
        Ok(()) => {
            info!(path = %dest.display(), bytes = bytes_written, "download complete");
            Ok(bytes_written)
        }
        Err(error) => {
            debug!(path = %dest.display(), bytes = bytes_written, "download failed mid-stream");
            Err(error)
        }
    }
}
