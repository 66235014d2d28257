use crate::error::{Result, UploaderError};
use crate::models::FetchedArchive;
use crate::utils::hash::StreamingHash;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Downloads an archive over HTTP into a scratch file.
#[derive(Clone)]
pub struct ArchiveFetcher {
    client: reqwest::Client,
}

impl ArchiveFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| {
                UploaderError::DownloadFailed(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }

    /// Fetches `source` into `destination`.
    ///
    /// The body is streamed into a temporary file next to `destination` and
    /// renamed into place once fully written, so `destination` never holds a
    /// truncated download.
    pub async fn fetch(&self, source: &Url, destination: &Path) -> Result<FetchedArchive> {
        info!("📥 Downloading ZIP archive from {}", source);

        let mut response = self
            .client
            .get(source.clone())
            .send()
            .await
            .map_err(|e| {
                UploaderError::DownloadFailed(format!("GET {} failed: {}", source, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploaderError::DownloadFailed(format!(
                "GET {} returned {}",
                source, status
            )));
        }

        let parent = destination.parent().unwrap_or_else(|| Path::new("."));
        let mut partial = tempfile::Builder::new()
            .prefix(".download-")
            .suffix(".part")
            .tempfile_in(parent)?;
        let mut hash = StreamingHash::new();

        while let Some(chunk) = response.chunk().await.map_err(|e| {
            UploaderError::DownloadFailed(format!("Reading body of {} failed: {}", source, e))
        })? {
            hash.update(&chunk);
            partial.write_all(&chunk)?;
        }

        partial.as_file_mut().sync_all()?;
        partial
            .persist(destination)
            .map_err(|e| UploaderError::Scratch(e.error))?;

        let (size, sha256) = hash.finish();
        info!(
            "✅ Downloaded {} bytes to {} (sha256: {})",
            size,
            destination.display(),
            sha256
        );

        Ok(FetchedArchive {
            path: destination.to_path_buf(),
            size,
            sha256,
        })
    }
}
