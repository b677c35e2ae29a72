use thiserror::Error;

/// Errors raised while fingerprinting file content
#[derive(Error, Debug)]
pub enum HashingError {
    #[error("Failed to read content '{content_ref}': {source}")]
    IoFailure {
        content_ref: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fingerprint '{value}': {reason}")]
    InvalidFingerprint { value: String, reason: String },
}

impl HashingError {
    pub fn io_failure(content_ref: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoFailure {
            content_ref: content_ref.into(),
            source,
        }
    }

    pub fn content_not_found(content_ref: impl Into<String>) -> Self {
        let content_ref = content_ref.into();
        let source = std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no content registered for '{content_ref}'"),
        );
        Self::IoFailure {
            content_ref,
            source,
        }
    }

    pub fn invalid_fingerprint(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFingerprint {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Check if the content could not be located at all
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::IoFailure { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

pub type HashingResult<T> = Result<T, HashingError>;
