use crate::error::{Result, UploaderError};
use crate::models::BucketHandle;
use crate::services::storage::{BucketCreation, StorageService};
use crate::utils::validation::validate_bucket_name;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Makes sure the destination bucket exists before anything is uploaded.
pub struct BucketProvisioner {
    storage: Arc<dyn StorageService>,
    prefix: String,
}

impl BucketProvisioner {
    pub fn new(storage: Arc<dyn StorageService>, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
        }
    }

    /// Generates `<prefix>-<uuid>`.
    pub fn generate_name(&self) -> String {
        format!("{}-{}", self.prefix, Uuid::new_v4())
    }

    /// Returns a handle to `requested`, or to a freshly named bucket when
    /// `None`. An existing bucket is left untouched.
    pub async fn provision(&self, requested: Option<&str>) -> Result<BucketHandle> {
        let name = match requested {
            Some(name) => name.to_string(),
            None => self.generate_name(),
        };
        validate_bucket_name(&name).map_err(|e| UploaderError::ProvisionFailed(e.to_string()))?;

        let region = self.storage.region();

        let exists = self.storage.bucket_exists(&name).await.map_err(|e| {
            UploaderError::ProvisionFailed(format!("Checking bucket '{}' failed: {:#}", name, e))
        })?;
        if exists {
            info!("✅ Bucket '{}' is ready", name);
            return Ok(BucketHandle {
                name,
                region,
                created: false,
            });
        }

        info!("🪣 Bucket '{}' not found, creating...", name);
        let creation = self.storage.create_bucket(&name).await.map_err(|e| {
            UploaderError::ProvisionFailed(format!("Creating bucket '{}' failed: {:#}", name, e))
        })?;

        let created = creation == BucketCreation::Created;
        if created {
            info!("✅ Bucket '{}' created successfully", name);
        } else {
            info!("✅ Bucket '{}' already owned, reusing it", name);
        }

        Ok(BucketHandle {
            name,
            region,
            created,
        })
    }
}
