use serde::{Deserialize, Serialize};
use std::path::Path;

/// A file handed to the pipeline
///
/// `id` is the correlation identity echoed back in the outcome notification,
/// `content_ref` is what a `ContentSource` resolves to the file bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileSubmission {
    pub id: String,
    pub content_ref: String,
}

impl FileSubmission {
    pub fn new(id: impl Into<String>, content_ref: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_ref: content_ref.into(),
        }
    }

    /// Submission for a file on disk, identified by its file name
    pub fn from_path(path: &Path) -> Option<Self> {
        let id = path.file_name()?.to_str()?.to_string();
        Some(Self::new(id, path.to_string_lossy()))
    }
}
