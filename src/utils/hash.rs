use sha2::{Digest, Sha256};

/// Incremental SHA-256 over a stream of chunks.
#[derive(Default)]
pub struct StreamingHash {
    hasher: Sha256,
    size: u64,
}

impl StreamingHash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.size += chunk.len() as u64;
    }

    /// Returns `(size, hex digest)`.
    pub fn finish(self) -> (u64, String) {
        (self.size, hex::encode(self.hasher.finalize()))
    }
}
