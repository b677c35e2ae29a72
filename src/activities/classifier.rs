use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::errors::{ActivityError, ActivityResult};
use super::http::{build_client, error_for_status, parse_endpoint, TransientFailurePolicy};
use crate::config::{RetryConfig, ServiceEndpointConfig};
use crate::constants::{file_types, http};
use crate::resilience::{RetryOutcome, RetryPolicy};

const SERVICE: &str = "classifier";

/// Determines the declared type of a file
#[async_trait]
pub trait FileTypeClassifier: Send + Sync {
    /// Returns the file type name, or the `"Error"` sentinel when the type could not
    /// be determined. Never fails.
    async fn classify(&self, content_locator: &str) -> String;
}

#[derive(Debug, Serialize)]
struct ClassificationRequest<'a> {
    #[serde(rename = "SasUrl")]
    sas_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassificationResponse {
    #[serde(rename = "FileTypeName")]
    file_type_name: String,
}

/// Classification service client
///
/// POSTs the content locator as JSON with the service key in the `x-api-key`
/// header, retrying transient failures under the configured policy.
#[derive(Debug, Clone)]
pub struct HttpFileTypeClassifier {
    client: Client,
    url: Url,
    api_key: String,
    retry: RetryPolicy,
    transient: TransientFailurePolicy,
}

impl HttpFileTypeClassifier {
    pub fn new(endpoint: &ServiceEndpointConfig, retry: &RetryConfig) -> ActivityResult<Self> {
        Ok(Self {
            client: build_client(SERVICE, endpoint)?,
            url: parse_endpoint(SERVICE, endpoint)?,
            api_key: endpoint.api_key.clone(),
            retry: retry.policy(SERVICE),
            transient: TransientFailurePolicy::from_config(retry),
        })
    }

    async fn request_file_type(&self, content_locator: &str) -> ActivityResult<String> {
        let response = self
            .client
            .post(self.url.clone())
            .header(http::API_KEY_HEADER, &self.api_key)
            .json(&ClassificationRequest {
                sas_url: content_locator,
            })
            .send()
            .await
            .map_err(|e| ActivityError::from_reqwest(SERVICE, e))?;

        if !response.status().is_success() {
            return Err(error_for_status(SERVICE, response).await);
        }

        let body: ClassificationResponse = response
            .json()
            .await
            .map_err(|e| ActivityError::malformed_response(SERVICE, e.to_string()))?;
        Ok(body.file_type_name)
    }
}

#[async_trait]
impl FileTypeClassifier for HttpFileTypeClassifier {
    async fn classify(&self, content_locator: &str) -> String {
        let outcome = self
            .retry
            .execute(
                |_| self.request_file_type(content_locator),
                |error| self.transient.is_transient(error),
            )
            .await;

        match outcome {
            RetryOutcome::Succeeded { value, attempts } => {
                info!(file_type = %value, attempts, "File type detected");
                value
            }
            RetryOutcome::Exhausted { last_error, attempts } => {
                warn!(error = %last_error, attempts, "File type detection retries exhausted");
                file_types::ERROR_SENTINEL.to_string()
            }
            RetryOutcome::Rejected { error, attempts } => {
                debug!(error = %error, attempts, "File type detection failed");
                file_types::ERROR_SENTINEL.to_string()
            }
        }
    }
}
