//! # Pipeline Configuration
//!
//! Typed configuration for every pipeline component. All sections carry serde
//! defaults, so an empty source produces a usable development configuration
//! (apart from the external service URLs, which must be supplied to use the HTTP
//! clients).
//!
//! Sources are layered by [`ConfigLoader`]: built-in defaults, then an optional
//! TOML/YAML/JSON file, then `REBUILD__SECTION__KEY` environment variables.

pub mod error;
pub mod loader;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{defaults, http, wire};
use crate::resilience::RetryPolicy;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub storage: StorageConfig,
    pub classifier: ServiceEndpointConfig,
    pub rebuilder: ServiceEndpointConfig,
    pub retry: RetryConfig,
    pub cache: CacheConfig,
    pub messaging: MessagingConfig,
    pub orchestration: OrchestrationConfig,
    pub coordinator: CoordinatorConfig,
}

/// Blob storage layout used to issue access locators
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub blob_endpoint: String,
    pub original_container: String,
    pub rebuild_container: String,
    /// Locator lifetime, measured from the workflow's recorded start time
    pub locator_expiry_hours: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            blob_endpoint: "http://127.0.0.1:10000/devstoreaccount1".to_string(),
            original_container: defaults::ORIGINAL_CONTAINER.to_string(),
            rebuild_container: defaults::REBUILD_CONTAINER.to_string(),
            locator_expiry_hours: defaults::LOCATOR_EXPIRY_HOURS,
        }
    }
}

impl StorageConfig {
    pub fn locator_expiry(&self) -> chrono::Duration {
        chrono::Duration::hours(self.locator_expiry_hours)
    }
}

/// Address and credentials of an external HTTP service
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceEndpointConfig {
    pub url: String,
    pub api_key: String,
    pub timeout_ms: u64,
}

impl Default for ServiceEndpointConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            timeout_ms: defaults::HTTP_TIMEOUT_MS,
        }
    }
}

impl ServiceEndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub retryable_status_codes: Vec<u16>,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::MAX_RETRIES,
            retryable_status_codes: http::DEFAULT_RETRYABLE_STATUS_CODES.to_vec(),
            delay_ms: 0,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self, name: impl Into<String>) -> RetryPolicy {
        RetryPolicy::new(name, self.max_retries).with_delay(Duration::from_millis(self.delay_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Partition shared by every entry this deployment writes
    pub namespace: String,
    pub table_name: String,
    /// PostgreSQL connection string; the in-memory cache is used when absent
    pub database_url: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: defaults::CACHE_NAMESPACE.to_string(),
            table_name: defaults::CACHE_TABLE_NAME.to_string(),
            database_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MessagingConfig {
    pub outcome_queue: String,
    pub message_label: String,
    /// Notification property compared against listener correlation ids
    pub identity_key: String,
    /// Deliveries after which an unclaimed notification is dead-lettered
    pub max_delivery_count: u32,
    pub batch_size: usize,
    pub poll_interval_ms: u64,
    pub visibility_timeout_seconds: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            outcome_queue: defaults::OUTCOME_QUEUE.to_string(),
            message_label: wire::TRANSACTION_OUTCOME_LABEL.to_string(),
            identity_key: wire::FILE_ID_PROPERTY.to_string(),
            max_delivery_count: defaults::MAX_DELIVERY_COUNT,
            batch_size: defaults::CONSUMER_BATCH_SIZE,
            poll_interval_ms: defaults::CONSUMER_POLL_INTERVAL_MS,
            visibility_timeout_seconds: defaults::VISIBILITY_TIMEOUT_SECONDS,
        }
    }
}

impl MessagingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_secs(self.visibility_timeout_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    /// Times a faulted workflow instance is re-entered before it is abandoned
    pub max_redrives: u32,
    pub redrive_backoff_ms: u64,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            max_redrives: defaults::MAX_REDRIVES,
            redrive_backoff_ms: defaults::REDRIVE_BACKOFF_MS,
        }
    }
}

impl OrchestrationConfig {
    pub fn redrive_backoff(&self) -> Duration {
        Duration::from_millis(self.redrive_backoff_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub outcome_timeout_seconds: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            outcome_timeout_seconds: defaults::OUTCOME_TIMEOUT_SECONDS,
        }
    }
}

impl CoordinatorConfig {
    pub fn outcome_timeout(&self) -> Duration {
        Duration::from_secs(self.outcome_timeout_seconds)
    }
}

impl PipelineConfig {
    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.storage.blob_endpoint.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "storage.blob_endpoint",
                "storage configuration",
            ));
        }
        for (field, container) in [
            ("storage.original_container", &self.storage.original_container),
            ("storage.rebuild_container", &self.storage.rebuild_container),
        ] {
            if container.trim().is_empty() {
                return Err(ConfigurationError::missing_required_field(field, "storage configuration"));
            }
        }
        if self.storage.locator_expiry_hours <= 0 {
            return Err(ConfigurationError::invalid_value(
                "storage.locator_expiry_hours",
                "must be positive",
            ));
        }

        for (section, endpoint) in [("classifier", &self.classifier), ("rebuilder", &self.rebuilder)] {
            if !endpoint.url.is_empty() && reqwest::Url::parse(&endpoint.url).is_err() {
                return Err(ConfigurationError::invalid_value(
                    format!("{section}.url"),
                    format!("'{}' is not a valid URL", endpoint.url),
                ));
            }
            if endpoint.timeout_ms == 0 {
                return Err(ConfigurationError::invalid_value(
                    format!("{section}.timeout_ms"),
                    "must be greater than 0",
                ));
            }
        }

        if let Some(code) = self
            .retry
            .retryable_status_codes
            .iter()
            .find(|code| !(100..=599).contains(*code))
        {
            return Err(ConfigurationError::invalid_value(
                "retry.retryable_status_codes",
                format!("{code} is not an HTTP status code"),
            ));
        }

        if self.cache.namespace.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "cache.namespace",
                "cache configuration",
            ));
        }

        if self.messaging.message_label.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "messaging.message_label",
                "messaging configuration",
            ));
        }
        if self.messaging.identity_key.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "messaging.identity_key",
                "messaging configuration",
            ));
        }
        if self.messaging.batch_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "messaging.batch_size",
                "must be greater than 0",
            ));
        }
        if self.messaging.max_delivery_count == 0 {
            return Err(ConfigurationError::invalid_value(
                "messaging.max_delivery_count",
                "must be greater than 0",
            ));
        }

        if self.coordinator.outcome_timeout_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "coordinator.outcome_timeout_seconds",
                "must be greater than 0",
            ));
        }

        Ok(())
    }

    /// JSON view of the configuration with credentials masked
    pub fn sanitized(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        for pointer in ["/classifier/api_key", "/rebuilder/api_key"] {
            if let Some(secret) = value.pointer_mut(pointer) {
                if secret.as_str().is_some_and(|s| !s.is_empty()) {
                    *secret = serde_json::Value::String("***REDACTED***".to_string());
                }
            }
        }
        if let Some(url) = value.pointer_mut("/cache/database_url") {
            if let Some(masked) = url.as_str().map(mask_url_password) {
                *url = serde_json::Value::String(masked);
            }
        }
        value
    }
}

/// Mask the password component of a connection URL
fn mask_url_password(raw: &str) -> String {
    match reqwest::Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some("***")).is_ok() {
                url.to_string()
            } else {
                "***REDACTED***".to_string()
            }
        }
        Ok(_) => raw.to_string(),
        Err(_) => "***REDACTED***".to_string(),
    }
}
