use std::io;
use std::path::Path;
use tracing::info;

/// Removes scratch state once a run has succeeded.
pub struct ScratchCleanup;

impl ScratchCleanup {
    /// Removes every path in `paths`; files and directory trees are both
    /// accepted and missing paths are ignored. All paths are attempted even
    /// if one fails; the first error is returned.
    pub async fn remove_all(paths: &[&Path]) -> io::Result<()> {
        let mut first_error = None;

        for path in paths {
            if let Err(e) = Self::remove(path).await {
                tracing::warn!("⚠️  Failed to remove {}: {}", path.display(), e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn remove(path: &Path) -> io::Result<()> {
        let metadata = match tokio::fs::symlink_metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        if metadata.is_dir() {
            tokio::fs::remove_dir_all(path).await?;
        } else {
            tokio::fs::remove_file(path).await?;
        }
        info!("🧹 Removed {}", path.display());
        Ok(())
    }
}
