//! Shared HTTP plumbing for the external service clients.

use reqwest::{Client, Url};
use std::collections::HashSet;
use std::time::Duration;

use super::errors::{ActivityError, ActivityResult};
use crate::config::{RetryConfig, ServiceEndpointConfig};

/// Decides which failures are worth another attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientFailurePolicy {
    retryable_status_codes: HashSet<u16>,
}

impl TransientFailurePolicy {
    pub fn new(retryable_status_codes: impl IntoIterator<Item = u16>) -> Self {
        Self {
            retryable_status_codes: retryable_status_codes.into_iter().collect(),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.retryable_status_codes.iter().copied())
    }

    /// Timeouts, connection failures and the configured status codes are transient
    pub fn is_transient(&self, error: &ActivityError) -> bool {
        match error {
            ActivityError::Status { status, .. } => self.retryable_status_codes.contains(status),
            ActivityError::Timeout { .. } | ActivityError::Connection { .. } => true,
            _ => false,
        }
    }
}

impl Default for TransientFailurePolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

pub(crate) fn build_client(service: &str, endpoint: &ServiceEndpointConfig) -> ActivityResult<Client> {
    Client::builder()
        .timeout(Duration::from_millis(endpoint.timeout_ms))
        .user_agent(format!("rebuild-core/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ActivityError::configuration(service, format!("failed to build HTTP client: {e}")))
}

pub(crate) fn parse_endpoint(service: &str, endpoint: &ServiceEndpointConfig) -> ActivityResult<Url> {
    if endpoint.url.trim().is_empty() {
        return Err(ActivityError::configuration(service, "no URL configured"));
    }
    Url::parse(&endpoint.url)
        .map_err(|e| ActivityError::configuration(service, format!("invalid URL '{}': {e}", endpoint.url)))
}

/// Turn a non-success response into an error carrying its body
pub(crate) async fn error_for_status(service: &str, response: reqwest::Response) -> ActivityError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ActivityError::status(service, status, body)
}
