use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A single file that did not make it into the bucket.
#[derive(Debug, Clone)]
pub struct UploadFailure {
    pub key: String,
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.key, self.path.display(), self.reason)
    }
}

#[derive(Error, Debug)]
pub enum UploaderError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Extraction failed: {0}")]
    ExtractFailed(String),

    #[error("Bucket provisioning failed: {0}")]
    ProvisionFailed(String),

    #[error("Enumeration failed: {0}")]
    EnumerationFailed(String),

    #[error("{} of {total} uploads failed; first failure: {}", .failures.len(), first_failure(.failures))]
    UploadFailed {
        failures: Vec<UploadFailure>,
        total: usize,
    },

    #[error("Run cancelled during {0}")]
    Cancelled(&'static str),

    #[error("Scratch storage error: {0}")]
    Scratch(#[from] std::io::Error),
}

fn first_failure(failures: &[UploadFailure]) -> String {
    failures
        .first()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

pub type Result<T, E = UploaderError> = std::result::Result<T, E>;
