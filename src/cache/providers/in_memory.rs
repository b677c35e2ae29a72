use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::cache::entry::CacheEntry;
use crate::cache::errors::CacheResult;
use crate::cache::traits::OutcomeCache;
use crate::hashing::ContentFingerprint;

/// Process-local outcome cache
///
/// Entries live for the lifetime of the process. Suitable for tests and for
/// single-node deployments that accept losing remembered outcomes on restart.
#[derive(Debug, Default)]
pub struct InMemoryOutcomeCache {
    entries: DashMap<(String, ContentFingerprint), CacheEntry>,
    lookups: AtomicU64,
    hits: AtomicU64,
    writes: AtomicU64,
}

/// Counters for an in-memory cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InMemoryCacheStats {
    pub lookups: u64,
    pub hits: u64,
    pub writes: u64,
    pub entries: usize,
}

impl InMemoryOutcomeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, namespace: &str, fingerprint: &ContentFingerprint) -> Option<CacheEntry> {
        self.entries
            .get(&(namespace.to_string(), *fingerprint))
            .map(|entry| entry.value().clone())
    }

    pub fn stats(&self) -> InMemoryCacheStats {
        InMemoryCacheStats {
            lookups: self.lookups.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

#[async_trait]
impl OutcomeCache for InMemoryOutcomeCache {
    async fn lookup(
        &self,
        namespace: &str,
        fingerprint: &ContentFingerprint,
    ) -> CacheResult<Option<CacheEntry>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let found = self.get(namespace, fingerprint);
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(namespace = %namespace, fingerprint = %fingerprint, "Cache HIT");
        } else {
            debug!(namespace = %namespace, fingerprint = %fingerprint, "Cache MISS");
        }
        Ok(found)
    }

    async fn upsert(&self, entry: &CacheEntry) -> CacheResult<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.entries
            .insert((entry.namespace.clone(), entry.fingerprint), entry.clone());
        debug!(
            namespace = %entry.namespace,
            fingerprint = %entry.fingerprint,
            file_status = %entry.file_status,
            "Cache entry written"
        );
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "in_memory"
    }
}
