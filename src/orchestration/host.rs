//! # Workflow Host
//!
//! Starts workflow instances and re-drives the ones that fault. A re-driven
//! instance replays its recorded steps and resumes at the first step that never
//! completed. Step history is purged once an instance finishes.
//!
//! Content that stays unreadable after the last redrive still gets an outcome:
//! `Error` is signaled before the instance is reported abandoned.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::context::{Clock, WorkflowContext};
use super::errors::{WorkflowError, WorkflowResult};
use super::file_processing::{FileProcessingOrchestrator, WorkflowSummary};
use super::step_store::StepResultStore;
use crate::config::OrchestrationConfig;
use crate::logging::log_error;
use crate::models::FileSubmission;

#[derive(Clone)]
pub struct WorkflowHost {
    orchestrator: Arc<FileProcessingOrchestrator>,
    store: Arc<dyn StepResultStore>,
    clock: Arc<dyn Clock>,
    max_redrives: u32,
    redrive_backoff: Duration,
}

impl WorkflowHost {
    pub fn new(
        orchestrator: Arc<FileProcessingOrchestrator>,
        store: Arc<dyn StepResultStore>,
        clock: Arc<dyn Clock>,
        config: &OrchestrationConfig,
    ) -> Self {
        Self {
            orchestrator,
            store,
            clock,
            max_redrives: config.max_redrives,
            redrive_backoff: config.redrive_backoff(),
        }
    }

    /// Start a new instance in the background
    pub fn start(&self, submission: FileSubmission) -> (Uuid, JoinHandle<WorkflowResult<WorkflowSummary>>) {
        let instance_id = Uuid::new_v4();
        let host = self.clone();
        let handle = tokio::spawn(async move { host.run_instance(instance_id, &submission).await });
        (instance_id, handle)
    }

    /// Drive an instance to completion, re-entering it after redrivable faults
    pub async fn run_instance(&self, instance_id: Uuid, submission: &FileSubmission) -> WorkflowResult<WorkflowSummary> {
        let mut redrives = 0;

        loop {
            let mut ctx = WorkflowContext::new(instance_id, Arc::clone(&self.store), Arc::clone(&self.clock));

            match self.orchestrator.run(&mut ctx, submission).await {
                Ok(summary) => {
                    if let Err(e) = self.store.purge(instance_id).await {
                        warn!(instance_id = %instance_id, error = %e, "Failed to purge step history");
                    }
                    return Ok(summary);
                }
                Err(e) if e.is_redrivable() && redrives < self.max_redrives => {
                    redrives += 1;
                    warn!(
                        instance_id = %instance_id,
                        file_id = %submission.id,
                        redrive = redrives,
                        max_redrives = self.max_redrives,
                        replayed_steps = ctx.replayed_steps(),
                        error = %e,
                        "🔄 Workflow faulted, re-driving"
                    );
                    if !self.redrive_backoff.is_zero() {
                        tokio::time::sleep(self.redrive_backoff).await;
                    }
                }
                Err(e) if e.is_redrivable() => {
                    if matches!(e, WorkflowError::Hashing(_)) {
                        self.signal_content_error(instance_id, submission).await;
                    }
                    error!(
                        instance_id = %instance_id,
                        file_id = %submission.id,
                        attempts = redrives + 1,
                        error = %e,
                        "❌ Workflow abandoned"
                    );
                    return Err(WorkflowError::Abandoned {
                        instance_id,
                        attempts: redrives + 1,
                        last_error: e.to_string(),
                    });
                }
                Err(e) => {
                    log_error(
                        "workflow_host",
                        "run_instance",
                        &e.to_string(),
                        Some(&format!("instance_id={instance_id} file_id={}", submission.id)),
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Publish the `Error` outcome for content that stayed unreadable
    async fn signal_content_error(&self, instance_id: Uuid, submission: &FileSubmission) {
        let mut ctx = WorkflowContext::new(instance_id, Arc::clone(&self.store), Arc::clone(&self.clock));
        match self.orchestrator.signal_content_error(&mut ctx, submission).await {
            Ok(()) => {
                if let Err(e) = self.store.purge(instance_id).await {
                    warn!(instance_id = %instance_id, error = %e, "Failed to purge step history");
                }
            }
            Err(e) => log_error(
                "workflow_host",
                "signal_content_error",
                &e.to_string(),
                Some(&format!("instance_id={instance_id} file_id={}", submission.id)),
            ),
        }
    }

    /// Run an instance on the current task, logging its result
    pub async fn process(&self, submission: FileSubmission) -> WorkflowResult<WorkflowSummary> {
        let instance_id = Uuid::new_v4();
        info!(instance_id = %instance_id, file_id = %submission.id, "Starting file processing workflow");
        self.run_instance(instance_id, &submission).await
    }
}
