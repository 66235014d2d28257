use crate::error::UploadFailure;
use std::path::{Path, PathBuf};

/// An extracted file and the object key it is uploaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub key: String,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }
}

/// Destination bucket, shared read-only by every upload task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketHandle {
    pub name: String,
    pub region: Option<String>,
    /// Whether this run created the bucket.
    pub created: bool,
}

/// The downloaded archive.
#[derive(Debug, Clone)]
pub struct FetchedArchive {
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

/// Aggregate result of one pipeline run. Every submitted task is accounted
/// for in either `uploaded` or `failures`.
#[derive(Debug, Default)]
pub struct UploadOutcome {
    pub uploaded: Vec<String>,
    pub failures: Vec<UploadFailure>,
    pub bytes: u64,
}

impl UploadOutcome {
    /// Number of tasks that reached a terminal state.
    pub fn completed(&self) -> usize {
        self.uploaded.len() + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What a successful run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub bucket: BucketHandle,
    pub archive_sha256: String,
    pub files_uploaded: usize,
    pub bytes_uploaded: u64,
}

/// Per-run scratch locations.
#[derive(Debug, Clone)]
pub struct ScratchPaths {
    pub root: PathBuf,
    pub archive: PathBuf,
}

impl ScratchPaths {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            archive: root.join("archive.zip"),
        }
    }
}
