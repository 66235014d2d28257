pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::config::UploaderConfig;
pub use crate::error::{UploadFailure, UploaderError};
pub use crate::models::{BucketHandle, FileEntry, RunSummary, UploadOutcome};
pub use crate::services::runner::{RunRequest, ZipUploader};
pub use crate::services::storage::{S3StorageService, StorageService};
pub use crate::services::upload_pipeline::UploadPipeline;
