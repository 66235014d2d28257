use std::path::Path;
use tokio::io::AsyncReadExt;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Bytes read from the start of a file for magic-number detection
const SNIFF_LEN: usize = 8192;

pub struct MetadataService;

impl MetadataService {
    /// Detects the MIME type of `bytes` from their magic number.
    pub fn content_type(bytes: &[u8]) -> &'static str {
        infer::get(bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Detects the MIME type of the file at `path`. Unreadable files fall back
    /// to the default type; the upload itself reports the read error.
    pub async fn content_type_of(path: &Path) -> &'static str {
        let mut header = Vec::with_capacity(SNIFF_LEN);
        match tokio::fs::File::open(path).await {
            Ok(file) => {
                if let Err(e) = file.take(SNIFF_LEN as u64).read_to_end(&mut header).await {
                    tracing::debug!("Could not sniff {}: {}", path.display(), e);
                    return DEFAULT_CONTENT_TYPE;
                }
                Self::content_type(&header)
            }
            Err(_) => DEFAULT_CONTENT_TYPE,
        }
    }
}
