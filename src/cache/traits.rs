use async_trait::async_trait;

use super::entry::CacheEntry;
use super::errors::CacheResult;
use crate::hashing::ContentFingerprint;

/// Durable store of previously computed outcomes, keyed by (namespace, fingerprint)
///
/// Implementations must make `upsert` an insert-or-merge: writing an entry for a key
/// that already exists replaces its type, status and timestamp, and writing the
/// same entry twice leaves the store unchanged.
#[async_trait]
pub trait OutcomeCache: Send + Sync {
    /// Returns `Ok(Some(entry))` on hit, `Ok(None)` on miss
    async fn lookup(
        &self,
        namespace: &str,
        fingerprint: &ContentFingerprint,
    ) -> CacheResult<Option<CacheEntry>>;

    async fn upsert(&self, entry: &CacheEntry) -> CacheResult<()>;

    /// Name of the backing provider, for logging
    fn provider_name(&self) -> &'static str;
}
