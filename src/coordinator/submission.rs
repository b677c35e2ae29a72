//! # Submission Coordinator
//!
//! Submits a batch of files and collects their outcome notifications. A
//! listener is registered for every file before any file is ingested, so an
//! outcome can never arrive ahead of its listener. Collection stops when every
//! outcome has arrived or the deadline passes; whatever has not arrived by then
//! is reported as outstanding.

use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use super::errors::{CoordinatorError, CoordinatorResult};
use super::ingestor::Ingestor;
use crate::config::{CoordinatorConfig, MessagingConfig};
use crate::constants::wire;
use crate::messaging::OutcomeNotification;
use crate::models::{FileSubmission, ProcessingOutcome};
use crate::registry::{CorrelationRouter, OutcomeListener};

/// Outcome received for one submitted file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcomeReport {
    pub file_id: String,
    /// Outcome property as published, or `"missing outcome"`
    pub outcome: String,
    /// Rebuilt artifact locator property as published, or `"missing outcome"`
    pub rebuilt_locator: String,
}

impl FileOutcomeReport {
    fn from_notification(file_id: &str, notification: &OutcomeNotification) -> Self {
        Self {
            file_id: file_id.to_string(),
            outcome: notification
                .property_or_missing(wire::FILE_OUTCOME_PROPERTY)
                .to_string(),
            rebuilt_locator: notification
                .property_or_missing(wire::FILE_REBUILD_LOCATOR_PROPERTY)
                .to_string(),
        }
    }

    pub fn parsed_outcome(&self) -> Option<ProcessingOutcome> {
        self.outcome.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionFailure {
    pub file_id: String,
    pub reason: String,
}

/// Result of a batch submission. Never an error: partial results are reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    /// Outcomes in arrival order
    pub outcomes: Vec<FileOutcomeReport>,
    /// Ingested files whose outcome did not arrive before the deadline, in
    /// submission order
    pub outstanding: Vec<String>,
    pub failed_ingestions: Vec<IngestionFailure>,
}

impl SubmissionReport {
    pub fn is_complete(&self) -> bool {
        self.outstanding.is_empty() && self.failed_ingestions.is_empty()
    }

    pub fn outcome_for(&self, file_id: &str) -> Option<&FileOutcomeReport> {
        self.outcomes.iter().find(|report| report.file_id == file_id)
    }
}

pub struct SubmissionCoordinator {
    router: Arc<CorrelationRouter>,
    ingestor: Arc<dyn Ingestor>,
    message_type: String,
    outcome_timeout: Duration,
}

impl SubmissionCoordinator {
    pub fn new(
        router: Arc<CorrelationRouter>,
        ingestor: Arc<dyn Ingestor>,
        messaging: &MessagingConfig,
        coordinator: &CoordinatorConfig,
    ) -> Self {
        Self {
            router,
            ingestor,
            message_type: messaging.message_label.clone(),
            outcome_timeout: coordinator.outcome_timeout(),
        }
    }

    pub fn with_outcome_timeout(mut self, outcome_timeout: Duration) -> Self {
        self.outcome_timeout = outcome_timeout;
        self
    }

    /// Submit every regular file directly inside `dir`, identified by file name
    pub async fn submit_directory(&self, dir: &Path) -> CoordinatorResult<SubmissionReport> {
        let directory_error = |source| CoordinatorError::Directory {
            path: dir.display().to_string(),
            source,
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(directory_error)?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(directory_error)? {
            let file_type = entry.file_type().await.map_err(directory_error)?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(submission) = FileSubmission::from_path(&entry.path()) {
                files.push(submission);
            }
        }
        files.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(self.submit_all(files).await)
    }

    pub async fn submit_all(&self, files: Vec<FileSubmission>) -> SubmissionReport {
        let mut report = SubmissionReport::default();
        let (tx, mut rx) = mpsc::unbounded_channel::<FileOutcomeReport>();

        let mut accepted = Vec::with_capacity(files.len());
        let mut seen = HashSet::new();
        for submission in files {
            if seen.insert(submission.id.clone()) {
                accepted.push(submission);
            } else {
                report.failed_ingestions.push(IngestionFailure {
                    file_id: submission.id,
                    reason: "duplicate submission id".to_string(),
                });
            }
        }

        let mut registrations: HashMap<String, Uuid> = HashMap::with_capacity(accepted.len());
        for submission in &accepted {
            let sender = tx.clone();
            let file_id = submission.id.clone();
            let listener: Arc<dyn OutcomeListener> = Arc::new(move |notification: &OutcomeNotification| {
                sender
                    .send(FileOutcomeReport::from_notification(&file_id, notification))
                    .is_ok()
            });
            let registration_id = self
                .router
                .register(self.message_type.clone(), submission.id.clone(), listener);
            registrations.insert(submission.id.clone(), registration_id);
        }
        drop(tx);

        let ingestions = join_all(accepted.iter().map(|submission| async move {
            (submission.id.as_str(), self.ingestor.ingest(submission).await)
        }))
        .await;

        let mut outstanding: HashSet<String> = HashSet::with_capacity(accepted.len());
        for (file_id, result) in ingestions {
            match result {
                Ok(()) => {
                    outstanding.insert(file_id.to_string());
                }
                Err(e) => {
                    warn!(file_id = %file_id, error = %e, "Ingestion failed");
                    if let Some(registration_id) = registrations.remove(file_id) {
                        self.router.unregister(registration_id);
                    }
                    report.failed_ingestions.push(IngestionFailure {
                        file_id: file_id.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let deadline = Instant::now() + self.outcome_timeout;
        while !outstanding.is_empty() {
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(outcome)) => {
                    if outstanding.remove(&outcome.file_id) {
                        info!(file_id = %outcome.file_id, outcome = %outcome.outcome, "Outcome received");
                        report.outcomes.push(outcome);
                    }
                }
                Ok(None) | Err(_) => break,
            }
        }

        // Listeners for outcomes that never arrived would otherwise stay registered
        report.outstanding = accepted
            .iter()
            .filter(|submission| outstanding.contains(&submission.id))
            .map(|submission| submission.id.clone())
            .collect();
        for file_id in &report.outstanding {
            if let Some(registration_id) = registrations.remove(file_id) {
                self.router.unregister(registration_id);
            }
        }

        if report.outstanding.is_empty() {
            info!(
                received = report.outcomes.len(),
                failed = report.failed_ingestions.len(),
                "✅ Submission complete"
            );
        } else {
            warn!(
                received = report.outcomes.len(),
                outstanding = ?report.outstanding,
                timeout_ms = self.outcome_timeout.as_millis() as u64,
                "Outcomes still outstanding at deadline"
            );
        }

        report
    }
}
