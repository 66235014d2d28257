use crate::error::{Result, UploaderError};
use crate::models::FileEntry;
use std::path::{Component, Path};
use tracing::{debug, info};

/// Walks an extracted tree and maps every regular file to its object key.
///
/// Symbolic links and special files (sockets, FIFOs, devices) are skipped and
/// never followed.
pub struct FileEnumerator;

impl FileEnumerator {
    /// Returns the regular files below `root`, sorted by key.
    pub async fn enumerate(root: &Path) -> Result<Vec<FileEntry>> {
        let metadata = tokio::fs::metadata(root).await.map_err(|e| {
            UploaderError::EnumerationFailed(format!("{}: {}", root.display(), e))
        })?;
        if !metadata.is_dir() {
            return Err(UploaderError::EnumerationFailed(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let mut entries = Vec::new();
        Self::walk(root, root, &mut entries).await?;
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        info!("🗂️  Found {} files under {}", entries.len(), root.display());
        Ok(entries)
    }

    #[async_recursion::async_recursion]
    async fn walk(root: &Path, dir: &Path, entries: &mut Vec<FileEntry>) -> Result<()> {
        let mut read_dir = tokio::fs::read_dir(dir).await.map_err(|e| {
            UploaderError::EnumerationFailed(format!("{}: {}", dir.display(), e))
        })?;

        while let Some(entry) = read_dir.next_entry().await.map_err(|e| {
            UploaderError::EnumerationFailed(format!("{}: {}", dir.display(), e))
        })? {
            let path = entry.path();
            // file_type() does not follow symlinks
            let file_type = entry.file_type().await.map_err(|e| {
                UploaderError::EnumerationFailed(format!("{}: {}", path.display(), e))
            })?;

            if file_type.is_dir() {
                Self::walk(root, &path, entries).await?;
            } else if file_type.is_file() {
                let key = object_key(root, &path)?;
                entries.push(FileEntry::new(path, key));
            } else {
                debug!("Skipping non-regular file {}", path.display());
            }
        }

        Ok(())
    }
}

/// Derives the object key for `path`: its path relative to `root`, joined with `/`.
pub fn object_key(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        UploaderError::EnumerationFailed(format!(
            "{} is not inside {}",
            path.display(),
            root.display()
        ))
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    UploaderError::EnumerationFailed(format!(
                        "{} is not valid UTF-8",
                        path.display()
                    ))
                })?;
                parts.push(part);
            }
            Component::CurDir => {}
            _ => {
                return Err(UploaderError::EnumerationFailed(format!(
                    "{} has an unexpected path component",
                    path.display()
                )));
            }
        }
    }

    let key = parts.join("/");
    crate::utils::validation::validate_object_key(&key)
        .map_err(|e| UploaderError::EnumerationFailed(format!("{}: {}", path.display(), e)))?;
    Ok(key)
}
