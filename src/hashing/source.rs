use async_trait::async_trait;
use dashmap::DashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncRead;
use tracing::debug;

use super::errors::{HashingError, HashingResult};

pub type ContentReader = Box<dyn AsyncRead + Send + Unpin>;

/// Resolves a content reference to a readable byte stream
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Open the referenced content for reading. The reader is released when dropped.
    async fn open(&self, content_ref: &str) -> HashingResult<ContentReader>;

    fn source_name(&self) -> &'static str;
}

/// Reads content from the local filesystem
///
/// Relative references resolve against `root` when one is configured; absolute
/// references are opened as given.
#[derive(Debug, Clone, Default)]
pub struct FileContentSource {
    root: Option<PathBuf>,
}

impl FileContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, content_ref: &str) -> PathBuf {
        let path = Path::new(content_ref);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl ContentSource for FileContentSource {
    async fn open(&self, content_ref: &str) -> HashingResult<ContentReader> {
        let path = self.resolve(content_ref);
        debug!(content_ref = %content_ref, path = %path.display(), "Opening file content");

        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| HashingError::io_failure(content_ref, e))?;
        Ok(Box::new(file))
    }

    fn source_name(&self) -> &'static str {
        "file"
    }
}

/// Content held in memory, keyed by reference
#[derive(Debug, Default)]
pub struct InMemoryContentSource {
    blobs: DashMap<String, Arc<[u8]>>,
}

impl InMemoryContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, content_ref: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let bytes: Vec<u8> = bytes.into();
        self.blobs.insert(content_ref.into(), Arc::from(bytes));
    }

    pub fn remove(&self, content_ref: &str) -> bool {
        self.blobs.remove(content_ref).is_some()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl ContentSource for InMemoryContentSource {
    async fn open(&self, content_ref: &str) -> HashingResult<ContentReader> {
        let bytes = self
            .blobs
            .get(content_ref)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| HashingError::content_not_found(content_ref))?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn source_name(&self) -> &'static str {
        "in_memory"
    }
}
