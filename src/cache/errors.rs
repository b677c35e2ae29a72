use thiserror::Error;

/// Errors that can occur during outcome cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to reach the cache backend
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    /// A stored row could not be decoded into a cache entry
    #[error("Cache serialization error: {0}")]
    SerializationError(String),

    /// Invalid cache configuration (table name, namespace)
    #[error("Cache configuration error: {0}")]
    ConfigurationError(String),

    /// Generic backend error
    #[error("Cache backend error: {0}")]
    BackendError(String),
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for CacheError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::ConnectionError(err.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::SerializationError(err.to_string())
            }
            other => Self::BackendError(other.to_string()),
        }
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
