use crate::error::UploadFailure;
use crate::models::{BucketHandle, FileEntry, UploadOutcome};
use crate::services::metadata::MetadataService;
use crate::services::storage::StorageService;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, warn};

/// Terminal state of one upload task.
struct TaskReport {
    entry: FileEntry,
    result: Result<u64, String>,
}

/// Uploads extracted files with at most `concurrency` transfers in flight.
///
/// [`UploadPipeline::upload`] is a barrier: it returns only once every
/// submitted file has either been uploaded or has failed, including when some
/// uploads fail or the run is cancelled.
pub struct UploadPipeline {
    storage: Arc<dyn StorageService>,
    concurrency: usize,
    cancel: CancellationToken,
}

impl UploadPipeline {
    /// A `concurrency` of zero is treated as one.
    pub fn new(storage: Arc<dyn StorageService>, concurrency: usize) -> Self {
        Self {
            storage,
            concurrency: concurrency.max(1),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn upload(&self, files: Vec<FileEntry>, bucket: &BucketHandle) -> UploadOutcome {
        let mut outcome = UploadOutcome::default();
        if files.is_empty() {
            return outcome;
        }

        let total = files.len();
        info!(
            "⬆️  Uploading {} files to '{}' ({} at a time)",
            total, bucket.name, self.concurrency
        );

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let bucket_name: Arc<str> = Arc::from(bucket.name.as_str());
        let mut tasks = JoinSet::new();

        for entry in files {
            // Acquiring before spawning bounds the number of live tasks.
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                permit = permits.clone().acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                outcome.record(TaskReport {
                    entry,
                    result: Err("cancelled before start".to_string()),
                });
                continue;
            };

            let storage = self.storage.clone();
            let cancel = self.cancel.clone();
            let bucket_name = bucket_name.clone();
            let span =
                tracing::info_span!("upload", bucket = %bucket_name, key = %entry.key);

            tasks.spawn(
                async move {
                    let _permit = permit;
                    let transfer =
                        AssertUnwindSafe(upload_one(storage.as_ref(), &bucket_name, &entry))
                            .catch_unwind();

                    let result = tokio::select! {
                        _ = cancel.cancelled() => Err("cancelled".to_string()),
                        res = transfer => {
                            res.unwrap_or_else(|_| Err("upload task panicked".to_string()))
                        }
                    };
                    TaskReport { entry, result }
                }
                .instrument(span),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => outcome.record(report),
                // Tasks are never aborted and panics are caught inside them.
                Err(e) => outcome.failures.push(UploadFailure {
                    key: String::new(),
                    path: Default::default(),
                    reason: format!("upload task did not complete: {}", e),
                }),
            }
        }

        debug_assert_eq!(outcome.completed(), total);
        if outcome.is_success() {
            info!(
                "✅ Uploaded {} files ({} bytes) to '{}'",
                outcome.uploaded.len(),
                outcome.bytes,
                bucket.name
            );
        } else {
            warn!(
                "⚠️  {} of {} uploads to '{}' failed",
                outcome.failures.len(),
                total,
                bucket.name
            );
        }
        outcome
    }
}

async fn upload_one(
    storage: &dyn StorageService,
    bucket: &str,
    entry: &FileEntry,
) -> Result<u64, String> {
    let content_type = MetadataService::content_type_of(&entry.path).await;
    storage
        .put_file(bucket, &entry.key, &entry.path, content_type)
        .await
        .map_err(|e| format!("{:#}", e))
}

impl UploadOutcome {
    fn record(&mut self, report: TaskReport) {
        match report.result {
            Ok(bytes) => {
                info!("⬆️  Uploaded {} ({} bytes)", report.entry.key, bytes);
                self.bytes += bytes;
                self.uploaded.push(report.entry.key);
            }
            Err(reason) => {
                warn!("❌ Failed to upload {}: {}", report.entry.key, reason);
                self.failures.push(UploadFailure {
                    key: report.entry.key,
                    path: report.entry.path,
                    reason,
                });
            }
        }
    }
}
