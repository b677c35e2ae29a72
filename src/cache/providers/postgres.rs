//! PostgreSQL-backed outcome cache.
//!
//! One row per (namespace, fingerprint). Upserts use `ON CONFLICT ... DO UPDATE` so
//! concurrent writers for the same fingerprint converge on the last write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use crate::cache::entry::CacheEntry;
use crate::cache::errors::{CacheError, CacheResult};
use crate::cache::traits::OutcomeCache;
use crate::hashing::ContentFingerprint;

#[derive(Debug, Clone)]
pub struct PgOutcomeCache {
    pool: PgPool,
    table: String,
}

impl PgOutcomeCache {
    /// The table name is interpolated into SQL, so only `[A-Za-z0-9_]` is accepted
    pub fn new(pool: PgPool, table: impl Into<String>) -> CacheResult<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self { pool, table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub async fn ensure_table(&self) -> CacheResult<()> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                namespace TEXT NOT NULL,
                fingerprint TEXT NOT NULL,
                file_type TEXT NOT NULL DEFAULT '',
                file_status TEXT NOT NULL,
                last_written TIMESTAMPTZ NOT NULL,
                PRIMARY KEY (namespace, fingerprint)
            )",
            self.table
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        debug!(table = %self.table, "Outcome cache table ready");
        Ok(())
    }
}

fn validate_table_name(table: &str) -> CacheResult<()> {
    let valid = !table.is_empty()
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !table.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(CacheError::ConfigurationError(format!(
            "invalid cache table name '{table}'"
        )))
    }
}

#[async_trait]
impl OutcomeCache for PgOutcomeCache {
    async fn lookup(
        &self,
        namespace: &str,
        fingerprint: &ContentFingerprint,
    ) -> CacheResult<Option<CacheEntry>> {
        let sql = format!(
            "SELECT file_type, file_status, last_written FROM {} WHERE namespace = $1 AND fingerprint = $2",
            self.table
        );
        let row: Option<(String, String, DateTime<Utc>)> = sqlx::query_as(&sql)
            .bind(namespace)
            .bind(fingerprint.to_hex())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((file_type, file_status, last_written)) => {
                debug!(namespace = %namespace, fingerprint = %fingerprint, "Cache HIT");
                Ok(Some(CacheEntry {
                    namespace: namespace.to_string(),
                    fingerprint: *fingerprint,
                    file_type,
                    file_status,
                    last_written,
                }))
            }
            None => {
                debug!(namespace = %namespace, fingerprint = %fingerprint, "Cache MISS");
                Ok(None)
            }
        }
    }

    async fn upsert(&self, entry: &CacheEntry) -> CacheResult<()> {
        let sql = format!(
            "INSERT INTO {} (namespace, fingerprint, file_type, file_status, last_written)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (namespace, fingerprint) DO UPDATE SET
                file_type = EXCLUDED.file_type,
                file_status = EXCLUDED.file_status,
                last_written = EXCLUDED.last_written",
            self.table
        );
        sqlx::query(&sql)
            .bind(&entry.namespace)
            .bind(entry.fingerprint.to_hex())
            .bind(&entry.file_type)
            .bind(&entry.file_status)
            .bind(entry.last_written)
            .execute(&self.pool)
            .await?;
        debug!(
            namespace = %entry.namespace,
            fingerprint = %entry.fingerprint,
            file_status = %entry.file_status,
            "Cache entry written"
        );
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "postgres"
    }
}
