//! # Pipeline Constants
//!
//! Wire literals and default values shared across the pipeline. The wire literals
//! are part of the outcome notification contract consumed by external callers and
//! must not change without coordinating with them.

/// Outcome notification wire contract
pub mod wire {
    /// Label carried by every outcome notification
    pub const TRANSACTION_OUTCOME_LABEL: &str = "transaction-outcome";

    /// Property holding the submission identity (the correlation identity)
    pub const FILE_ID_PROPERTY: &str = "file-id";

    /// Property holding the `ProcessingOutcome` name
    pub const FILE_OUTCOME_PROPERTY: &str = "file-outcome";

    /// Property holding the rebuilt artifact read locator (empty when not applicable)
    pub const FILE_REBUILD_LOCATOR_PROPERTY: &str = "file-rebuild-sas";

    /// Value reported for a property the notification does not carry
    pub const MISSING_PROPERTY_VALUE: &str = "missing outcome";
}

/// File type names returned by the classification service that end processing
pub mod file_types {
    /// Sentinel returned by the classifier client once its retries are exhausted
    pub const ERROR_SENTINEL: &str = "Error";

    pub const ERROR: &str = "error";
    pub const UNMANAGED: &str = "unmanaged";
    pub const UNKNOWN: &str = "unknown";
}

/// HTTP details of the external classification and rebuild services
pub mod http {
    /// Header carrying the classification service key
    pub const API_KEY_HEADER: &str = "x-api-key";

    /// Query parameter carrying the rebuild service key
    pub const REBUILD_KEY_QUERY_PARAM: &str = "code";

    /// Header the rebuild service must send when writing the artifact
    pub const BLOB_TYPE_HEADER: &str = "x-ms-blob-type";
    pub const BLOB_TYPE_BLOCK: &str = "BlockBlob";

    /// Status codes retried by default: request timeout, internal server error,
    /// bad gateway, service unavailable, gateway timeout
    pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 5] = [408, 500, 502, 503, 504];
}

/// Defaults used when configuration omits a value
pub mod defaults {
    pub const CACHE_NAMESPACE: &str = "durablefileprocessing";
    pub const CACHE_TABLE_NAME: &str = "file_outcome_cache";
    pub const ORIGINAL_CONTAINER: &str = "original-store";
    pub const REBUILD_CONTAINER: &str = "rebuild-store";
    pub const OUTCOME_QUEUE: &str = "transaction-outcome";

    /// Retries after the first attempt (six attempts in total)
    pub const MAX_RETRIES: u32 = 5;

    pub const LOCATOR_EXPIRY_HOURS: i64 = 24;
    pub const HTTP_TIMEOUT_MS: u64 = 30_000;
    pub const OUTCOME_TIMEOUT_SECONDS: u64 = 30;
    pub const MAX_REDRIVES: u32 = 3;
    pub const REDRIVE_BACKOFF_MS: u64 = 250;
    pub const MAX_DELIVERY_COUNT: u32 = 10;
    pub const CONSUMER_BATCH_SIZE: usize = 16;
    pub const CONSUMER_POLL_INTERVAL_MS: u64 = 50;
    pub const VISIBILITY_TIMEOUT_SECONDS: u64 = 30;
}

/// Names of the recorded workflow steps, in execution order
pub mod steps {
    pub const CURRENT_UTC: &str = "current_utc";
    pub const HASH_CONTENT: &str = "hash_content";
    pub const CACHE_LOOKUP: &str = "cache_lookup";
    pub const CLASSIFY: &str = "classify";
    pub const REBUILD: &str = "rebuild";
    pub const SIGNAL_OUTCOME: &str = "signal_outcome";
    pub const CACHE_WRITE: &str = "cache_write";

    /// Replaces `hash_content` onward when the content could never be read
    pub const SIGNAL_CONTENT_ERROR: &str = "signal_content_error";
}
