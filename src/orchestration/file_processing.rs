//! # File Processing Orchestrator
//!
//! The workflow run for one submitted file:
//!
//! 1. Record the start time and derive the locator expiry from it
//! 2. Fingerprint the content
//! 3. Look up a remembered outcome for the fingerprint (faults read as a miss)
//! 4. Classify the file unless the cache knew its type
//! 5. Rebuild unless the type ends processing or the cache knew the outcome
//! 6. Signal the outcome
//! 7. Write the outcome back to the cache if fresh work was done (faults ignored)
//!
//! Every external interaction is a recorded step, so re-running an instance
//! after a crash repeats none of the work already completed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::context::WorkflowContext;
use super::errors::{WorkflowError, WorkflowResult};
use crate::activities::{FileRebuilder, FileTypeClassifier, LocatorIssuer, LocatorPermissions};
use crate::cache::{CacheEntry, OutcomeCache};
use crate::config::{CacheConfig, StorageConfig};
use crate::constants::{file_types, steps};
use crate::hashing::{ContentFingerprint, ContentHasher};
use crate::messaging::OutcomeSignaler;
use crate::models::{FileSubmission, ProcessingOutcome, RebuildResult};
use crate::state_machine::{WorkflowState, WorkflowStateMachine};

/// Services a workflow run calls out to
#[derive(Clone)]
pub struct WorkflowActivities {
    pub hasher: Arc<ContentHasher>,
    pub cache: Arc<dyn OutcomeCache>,
    pub classifier: Arc<dyn FileTypeClassifier>,
    pub rebuilder: Arc<dyn FileRebuilder>,
    pub locators: Arc<dyn LocatorIssuer>,
    pub signaler: OutcomeSignaler,
}

/// What a finished workflow run decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub instance_id: Uuid,
    pub file_id: String,
    pub fingerprint: ContentFingerprint,
    pub file_type: String,
    pub outcome: ProcessingOutcome,
    pub rebuilt_locator: Option<String>,
    pub cache_hit: bool,
    pub cache_written: bool,
    pub states: Vec<WorkflowState>,
}

/// Outcome decided by the file type alone, when the type ends processing.
///
/// Matching is case-insensitive: `error` maps to `Error`, `unmanaged` and
/// `unknown` map to `Unmanaged`. A blank type counts as unknown.
pub fn outcome_for_file_type(file_type: &str) -> Option<ProcessingOutcome> {
    let normalized = file_type.trim().to_ascii_lowercase();
    match normalized.as_str() {
        file_types::ERROR => Some(ProcessingOutcome::Error),
        file_types::UNMANAGED | file_types::UNKNOWN | "" => Some(ProcessingOutcome::Unmanaged),
        _ => None,
    }
}

pub struct FileProcessingOrchestrator {
    activities: WorkflowActivities,
    storage: StorageConfig,
    cache_namespace: String,
}

impl FileProcessingOrchestrator {
    pub fn new(activities: WorkflowActivities, storage: StorageConfig, cache: &CacheConfig) -> Self {
        Self {
            activities,
            storage,
            cache_namespace: cache.namespace.clone(),
        }
    }

    pub async fn run(&self, ctx: &mut WorkflowContext, submission: &FileSubmission) -> WorkflowResult<WorkflowSummary> {
        let instance_id = ctx.instance_id();
        let mut machine = WorkflowStateMachine::new(instance_id);

        let started_at = ctx.current_utc().await?;
        let expires_at = locator_expiry(started_at, &self.storage);

        let fingerprint: ContentFingerprint = ctx
            .step(steps::HASH_CONTENT, || async {
                Ok::<_, WorkflowError>(self.activities.hasher.hash(&submission.content_ref).await?)
            })
            .await?;

        machine.transition(WorkflowState::CacheLookup)?;
        let cached: Option<CacheEntry> = ctx
            .step(steps::CACHE_LOOKUP, || async { Ok(self.lookup_cache(&fingerprint).await) })
            .await?;

        // A cached entry without a file type is treated as a miss
        let cached = cached.filter(|entry| entry.known_file_type().is_some());
        let cache_hit = cached.is_some();
        let mut fresh_work = false;

        let (file_type, remembered) = match &cached {
            Some(entry) => {
                machine.transition(WorkflowState::CacheHit)?;
                let file_type = entry.known_file_type().unwrap_or_default().to_string();
                info!(
                    instance_id = %instance_id,
                    fingerprint = %fingerprint,
                    file_type = %file_type,
                    file_status = %entry.file_status,
                    "Cache hit"
                );
                (file_type, entry.remembered_outcome())
            }
            None => {
                machine.transition(WorkflowState::Classifying)?;
                fresh_work = true;
                let locator = self.activities.locators.issue(
                    &self.storage.original_container,
                    &submission.id,
                    expires_at,
                    LocatorPermissions::READ_WRITE,
                );
                let file_type: String = ctx
                    .step(steps::CLASSIFY, || async {
                        Ok(self.activities.classifier.classify(&locator).await)
                    })
                    .await?;
                (file_type, None)
            }
        };

        let outcome = if let Some(outcome) = outcome_for_file_type(&file_type) {
            machine.transition(WorkflowState::Skipped)?;
            info!(instance_id = %instance_id, file_type = %file_type, outcome = %outcome, "Rebuild skipped for file type");
            outcome
        } else if let Some(outcome) = remembered {
            machine.transition(WorkflowState::Skipped)?;
            outcome
        } else {
            machine.transition(WorkflowState::Rebuilding)?;
            fresh_work = true;
            let source = self.activities.locators.issue(
                &self.storage.original_container,
                &submission.id,
                expires_at,
                LocatorPermissions::READ,
            );
            let destination = self.activities.locators.issue(
                &self.storage.rebuild_container,
                &fingerprint.to_hex(),
                expires_at,
                LocatorPermissions::WRITE,
            );
            let result: RebuildResult = ctx
                .step(steps::REBUILD, || async {
                    Ok(self
                        .activities
                        .rebuilder
                        .rebuild(&source, &destination, &file_type)
                        .await)
                })
                .await?;
            ProcessingOutcome::from_rebuild(result)
        };

        let rebuilt_locator = outcome.has_artifact().then(|| {
            self.activities.locators.issue(
                &self.storage.rebuild_container,
                &fingerprint.to_hex(),
                expires_at,
                LocatorPermissions::READ,
            )
        });

        machine.transition(WorkflowState::Signaling)?;
        let _message_id: String = ctx
            .step(steps::SIGNAL_OUTCOME, || async {
                let message_id = self
                    .activities
                    .signaler
                    .signal(&submission.id, outcome, rebuilt_locator.as_deref())
                    .await?;
                Ok::<_, WorkflowError>(message_id.to_string())
            })
            .await?;

        let cache_written = if fresh_work {
            let entry = CacheEntry::new(
                self.cache_namespace.clone(),
                fingerprint,
                file_type.clone(),
                outcome,
                started_at,
            );
            ctx.step(steps::CACHE_WRITE, || async { Ok(self.write_back(&entry).await) })
                .await?
        } else {
            false
        };

        machine.transition(WorkflowState::Done)?;
        info!(
            instance_id = %instance_id,
            file_id = %submission.id,
            outcome = %outcome,
            cache_hit,
            cache_written,
            "✅ File processing complete"
        );

        Ok(WorkflowSummary {
            instance_id,
            file_id: submission.id.clone(),
            fingerprint,
            file_type,
            outcome,
            rebuilt_locator,
            cache_hit,
            cache_written,
            states: machine.history().to_vec(),
        })
    }

    /// Close out an instance whose content could not be read.
    ///
    /// Signals `Error` with an empty locator as a recorded step in place of
    /// `hash_content`. Nothing is cached since there is no fingerprint.
    pub async fn signal_content_error(&self, ctx: &mut WorkflowContext, submission: &FileSubmission) -> WorkflowResult<()> {
        let mut machine = WorkflowStateMachine::new(ctx.instance_id());
        ctx.current_utc().await?;

        machine.transition(WorkflowState::Signaling)?;
        let _message_id: String = ctx
            .step(steps::SIGNAL_CONTENT_ERROR, || async {
                let message_id = self
                    .activities
                    .signaler
                    .signal(&submission.id, ProcessingOutcome::Error, None)
                    .await?;
                Ok::<_, WorkflowError>(message_id.to_string())
            })
            .await?;

        machine.transition(WorkflowState::Done)?;
        warn!(
            instance_id = %ctx.instance_id(),
            file_id = %submission.id,
            content_ref = %submission.content_ref,
            "Content unreadable, signaled Error outcome"
        );
        Ok(())
    }

    async fn lookup_cache(&self, fingerprint: &ContentFingerprint) -> Option<CacheEntry> {
        match self.activities.cache.lookup(&self.cache_namespace, fingerprint).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(
                    fingerprint = %fingerprint,
                    provider = self.activities.cache.provider_name(),
                    error = %e,
                    "Cache lookup failed, treating as miss"
                );
                None
            }
        }
    }

    async fn write_back(&self, entry: &CacheEntry) -> bool {
        match self.activities.cache.upsert(entry).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    fingerprint = %entry.fingerprint,
                    provider = self.activities.cache.provider_name(),
                    error = %e,
                    "Cache write-back failed, continuing"
                );
                false
            }
        }
    }
}

/// Expiry applied to every locator issued by a run that started at `started_at`
pub fn locator_expiry(started_at: DateTime<Utc>, storage: &StorageConfig) -> DateTime<Utc> {
    started_at + storage.locator_expiry()
}
