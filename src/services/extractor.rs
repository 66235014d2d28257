use crate::error::{Result, UploaderError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Unpacks ZIP archives into fresh scratch directories.
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    scratch_root: PathBuf,
}

impl ArchiveExtractor {
    pub fn new(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: scratch_root.into(),
        }
    }

    /// Extracts `archive` into a new directory under the scratch root.
    ///
    /// On any failure the partially populated directory is removed before the
    /// error is returned.
    pub async fn extract(&self, archive: &Path) -> Result<PathBuf> {
        info!("📦 Extracting ZIP archive {}", archive.display());

        let archive = archive.to_path_buf();
        let scratch_root = self.scratch_root.clone();

        tokio::task::spawn_blocking(move || extract_blocking(&archive, &scratch_root))
            .await
            .map_err(|e| {
                UploaderError::ExtractFailed(format!("Extraction task failed: {}", e))
            })?
    }
}

fn extract_blocking(archive: &Path, scratch_root: &Path) -> Result<PathBuf> {
    let target = tempfile::Builder::new()
        .prefix("extracted-")
        .tempdir_in(scratch_root)?;

    let file = fs::File::open(archive).map_err(|e| {
        UploaderError::ExtractFailed(format!("Failed to open {}: {}", archive.display(), e))
    })?;
    let mut reader = zip::ZipArchive::new(file)
        .map_err(|e| UploaderError::ExtractFailed(format!("Failed to parse ZIP: {}", e)))?;

    let mut files = 0usize;
    for i in 0..reader.len() {
        let mut entry = reader.by_index(i).map_err(|e| {
            UploaderError::ExtractFailed(format!("Failed to read ZIP entry {}: {}", i, e))
        })?;

        let relative = entry.enclosed_name().map(Path::to_path_buf).ok_or_else(|| {
            UploaderError::ExtractFailed(format!(
                "Entry '{}' escapes the extraction directory",
                entry.name()
            ))
        })?;
        let out_path = target.path().join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| io_failure(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_failure(parent, e))?;
        }
        let mut out = fs::File::create(&out_path).map_err(|e| io_failure(&out_path, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| {
            UploaderError::ExtractFailed(format!("Failed to extract '{}': {}", entry.name(), e))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o777))
                    .map_err(|e| io_failure(&out_path, e))?;
            }
        }

        debug!("Extracted {}", relative.display());
        files += 1;
    }

    let target = target.keep();
    info!("✅ Extracted {} files to {}", files, target.display());
    Ok(target)
}

fn io_failure(path: &Path, e: io::Error) -> UploaderError {
    UploaderError::ExtractFailed(format!("{}: {}", path.display(), e))
}
