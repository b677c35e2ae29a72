use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

use super::errors::{ActivityError, ActivityResult};
use super::http::{build_client, error_for_status, parse_endpoint, TransientFailurePolicy};
use crate::config::{RetryConfig, ServiceEndpointConfig};
use crate::constants::http;
use crate::models::RebuildResult;
use crate::resilience::{RetryOutcome, RetryPolicy};

const SERVICE: &str = "rebuilder";

/// Produces a sanitized copy of a file
#[async_trait]
pub trait FileRebuilder: Send + Sync {
    /// Read from `source_locator` and write the rebuilt artifact to
    /// `destination_locator`. Never fails; every failure maps onto a result.
    async fn rebuild(
        &self,
        source_locator: &str,
        destination_locator: &str,
        declared_file_type: &str,
    ) -> RebuildResult;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct RebuildRequest<'a> {
    input_get_url: &'a str,
    output_put_url: &'a str,
    output_put_url_request_headers: HashMap<&'static str, &'static str>,
}

/// Rebuild service client
///
/// The service key travels as the `code` query parameter. HTTP 422 means the
/// service understood the file and declined to rebuild it.
#[derive(Debug, Clone)]
pub struct HttpFileRebuilder {
    client: Client,
    url: Url,
    retry: RetryPolicy,
    transient: TransientFailurePolicy,
}

impl HttpFileRebuilder {
    pub fn new(endpoint: &ServiceEndpointConfig, retry: &RetryConfig) -> ActivityResult<Self> {
        let mut url = parse_endpoint(SERVICE, endpoint)?;
        if !endpoint.api_key.is_empty() {
            url.query_pairs_mut()
                .append_pair(http::REBUILD_KEY_QUERY_PARAM, &endpoint.api_key);
        }
        Ok(Self {
            client: build_client(SERVICE, endpoint)?,
            url,
            retry: retry.policy(SERVICE),
            transient: TransientFailurePolicy::from_config(retry),
        })
    }

    async fn request_rebuild(&self, source_locator: &str, destination_locator: &str) -> ActivityResult<()> {
        let request = RebuildRequest {
            input_get_url: source_locator,
            output_put_url: destination_locator,
            output_put_url_request_headers: HashMap::from([(
                http::BLOB_TYPE_HEADER,
                http::BLOB_TYPE_BLOCK,
            )]),
        };

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| ActivityError::from_reqwest(SERVICE, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            return Err(ActivityError::Unprocessable {
                service: SERVICE.to_string(),
                body,
            });
        }
        Err(error_for_status(SERVICE, response).await)
    }
}

#[async_trait]
impl FileRebuilder for HttpFileRebuilder {
    async fn rebuild(
        &self,
        source_locator: &str,
        destination_locator: &str,
        declared_file_type: &str,
    ) -> RebuildResult {
        let outcome = self
            .retry
            .execute(
                |_| self.request_rebuild(source_locator, destination_locator),
                |error| self.transient.is_transient(error),
            )
            .await;

        match outcome {
            RetryOutcome::Succeeded { attempts, .. } => {
                info!(file_type = %declared_file_type, attempts, "File rebuilt");
                RebuildResult::Rebuilt
            }
            RetryOutcome::Rejected {
                error: ActivityError::Unprocessable { body, .. },
                ..
            } => {
                info!(file_type = %declared_file_type, reason = %body, "File is not rebuildable");
                RebuildResult::NotRebuildable
            }
            RetryOutcome::Rejected { error, attempts } | RetryOutcome::Exhausted { last_error: error, attempts } => {
                warn!(file_type = %declared_file_type, error = %error, attempts, "File rebuild failed");
                RebuildResult::Error
            }
        }
    }
}
