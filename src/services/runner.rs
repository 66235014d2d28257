use crate::config::UploaderConfig;
use crate::error::{Result, UploaderError};
use crate::models::{RunSummary, ScratchPaths};
use crate::services::cleanup::ScratchCleanup;
use crate::services::enumerator::FileEnumerator;
use crate::services::extractor::ArchiveExtractor;
use crate::services::fetcher::ArchiveFetcher;
use crate::services::provisioner::BucketProvisioner;
use crate::services::storage::StorageService;
use crate::services::upload_pipeline::UploadPipeline;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

/// One archive-to-bucket run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub source: Url,
    /// Generated when `None`.
    pub bucket_name: Option<String>,
    pub concurrency: usize,
}

/// Fetch, extract, enumerate, provision, upload, clean up.
pub struct ZipUploader {
    storage: Arc<dyn StorageService>,
    fetcher: ArchiveFetcher,
    config: UploaderConfig,
    cancel: CancellationToken,
}

impl ZipUploader {
    pub fn new(storage: Arc<dyn StorageService>, config: UploaderConfig) -> Result<Self> {
        let fetcher = ArchiveFetcher::new(Duration::from_secs(config.fetch_timeout_secs))?;
        Ok(Self {
            storage,
            fetcher,
            config,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs every stage in order. A failing stage skips the rest and leaves
    /// scratch files in place for inspection.
    pub async fn run(&self, request: RunRequest) -> Result<RunSummary> {
        if request.concurrency == 0 {
            return Err(UploaderError::InvalidArgument(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let root = tempfile::Builder::new()
            .prefix("s3-zip-uploader-")
            .tempdir_in(&self.config.scratch_dir)?
            .keep();
        let scratch = ScratchPaths::new(&root);

        match self.run_stages(&request, &scratch).await {
            Ok((summary, extracted)) => {
                if let Err(e) = ScratchCleanup::remove_all(&[
                    scratch.archive.as_path(),
                    extracted.as_path(),
                    scratch.root.as_path(),
                ])
                .await
                {
                    warn!("⚠️  Scratch cleanup incomplete: {}", e);
                }
                Ok(summary)
            }
            Err(e) => {
                warn!(
                    "🗃️  Run failed, scratch files kept at {}",
                    scratch.root.display()
                );
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        request: &RunRequest,
        scratch: &ScratchPaths,
    ) -> Result<(RunSummary, PathBuf)> {
        let archive = self
            .unless_cancelled("download", self.fetcher.fetch(&request.source, &scratch.archive))
            .await?;

        let extractor = ArchiveExtractor::new(&scratch.root);
        let extracted = self
            .unless_cancelled("extraction", extractor.extract(&archive.path))
            .await?;

        let files = self
            .unless_cancelled("enumeration", FileEnumerator::enumerate(&extracted))
            .await?;

        let provisioner =
            BucketProvisioner::new(self.storage.clone(), self.config.bucket_prefix.as_str());
        let bucket = self
            .unless_cancelled(
                "provisioning",
                provisioner.provision(request.bucket_name.as_deref()),
            )
            .await?;

        if self.cancel.is_cancelled() {
            return Err(self.cancelled("upload"));
        }
        let outcome = UploadPipeline::new(self.storage.clone(), request.concurrency)
            .with_cancellation(self.cancel.clone())
            .upload(files, &bucket)
            .await;

        if self.cancel.is_cancelled() && !outcome.is_success() {
            warn!(
                "🛑 {} of {} files uploaded before cancellation",
                outcome.uploaded.len(),
                outcome.completed()
            );
            return Err(self.cancelled("upload"));
        }

        if !outcome.is_success() {
            return Err(UploaderError::UploadFailed {
                total: outcome.completed(),
                failures: outcome.failures,
            });
        }

        info!(
            "🎉 Uploaded {} files from {} to bucket '{}'",
            outcome.uploaded.len(),
            request.source,
            bucket.name
        );

        Ok((
            RunSummary {
                files_uploaded: outcome.uploaded.len(),
                bytes_uploaded: outcome.bytes,
                archive_sha256: archive.sha256,
                bucket,
            },
            extracted,
        ))
    }

    /// Drives `stage` unless the run is cancelled first. A dropped download
    /// removes its partial file; an extraction already on the blocking pool
    /// finishes in the background inside the kept scratch directory.
    async fn unless_cancelled<T>(
        &self,
        stage: &'static str,
        work: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(self.cancelled(stage)),
            res = work => res,
        }
    }

    fn cancelled(&self, stage: &'static str) -> UploaderError {
        warn!("🛑 Run cancelled during {}", stage);
        UploaderError::Cancelled(stage)
    }
}
