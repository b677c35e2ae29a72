use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hashing::ContentFingerprint;
use crate::models::ProcessingOutcome;

/// Remembered classification and outcome for one fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub namespace: String,
    pub fingerprint: ContentFingerprint,
    /// Declared file type; empty when classification never produced one
    pub file_type: String,
    /// `ProcessingOutcome` name as written; kept as text so unrecognized values survive
    pub file_status: String,
    pub last_written: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(
        namespace: impl Into<String>,
        fingerprint: ContentFingerprint,
        file_type: impl Into<String>,
        outcome: ProcessingOutcome,
        last_written: DateTime<Utc>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            fingerprint,
            file_type: file_type.into(),
            file_status: outcome.to_string(),
            last_written,
        }
    }

    /// Cached file type, when one was recorded
    pub fn known_file_type(&self) -> Option<&str> {
        let file_type = self.file_type.trim();
        (!file_type.is_empty()).then_some(file_type)
    }

    /// Cached outcome that can be reused without fresh work.
    ///
    /// `Unknown` and unparseable statuses yield `None` so the caller falls back to
    /// a fresh rebuild.
    pub fn remembered_outcome(&self) -> Option<ProcessingOutcome> {
        self.file_status
            .parse::<ProcessingOutcome>()
            .ok()
            .filter(ProcessingOutcome::is_terminal)
    }
}
