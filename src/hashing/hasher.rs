use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use super::errors::{HashingError, HashingResult};
use super::fingerprint::ContentFingerprint;
use super::source::ContentSource;

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Streams content from a `ContentSource` through SHA-256
pub struct ContentHasher {
    source: Arc<dyn ContentSource>,
    chunk_size: usize,
}

impl ContentHasher {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Fingerprint the referenced content without holding it all in memory
    pub async fn hash(&self, content_ref: &str) -> HashingResult<ContentFingerprint> {
        let mut reader = self.source.open(content_ref).await.map_err(|e| {
            warn!(content_ref = %content_ref, source = self.source.source_name(), error = %e, "Failed to open content");
            e
        })?;

        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.chunk_size];
        let mut total_bytes: u64 = 0;

        loop {
            let read = reader
                .read(&mut buffer)
                .await
                .map_err(|e| HashingError::io_failure(content_ref, e))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
            total_bytes += read as u64;
        }

        let fingerprint = ContentFingerprint::from_bytes(hasher.finalize().into());
        debug!(
            content_ref = %content_ref,
            bytes = total_bytes,
            fingerprint = %fingerprint,
            "Content fingerprinted"
        );
        Ok(fingerprint)
    }
}

/// Fingerprint bytes already in memory
pub fn hash_bytes(bytes: &[u8]) -> ContentFingerprint {
    ContentFingerprint::from_bytes(Sha256::digest(bytes).into())
}
