use async_trait::async_trait;
use tracing::debug;

use super::errors::CoordinatorResult;
use crate::models::FileSubmission;
use crate::orchestration::WorkflowHost;

/// Hands a file to the pipeline. Returns once the file is accepted; processing
/// continues asynchronously and ends with an outcome notification.
#[async_trait]
pub trait Ingestor: Send + Sync {
    async fn ingest(&self, submission: &FileSubmission) -> CoordinatorResult<()>;
}

#[async_trait]
impl Ingestor for WorkflowHost {
    async fn ingest(&self, submission: &FileSubmission) -> CoordinatorResult<()> {
        let (instance_id, _handle) = self.start(submission.clone());
        debug!(instance_id = %instance_id, file_id = %submission.id, "Workflow started for submission");
        Ok(())
    }
}
