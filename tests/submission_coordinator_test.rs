//! Batch submission: files in, correlated outcomes back

mod common;

use async_trait::async_trait;
use common::PipelineBuilder;
use rebuild_core::config::{CoordinatorConfig, MessagingConfig};
use rebuild_core::coordinator::{CoordinatorError, CoordinatorResult, Ingestor, SubmissionCoordinator};
use rebuild_core::hashing::{ContentSource, FileContentSource};
use rebuild_core::messaging::{
    InMemoryOutcomeQueue, NotificationSender, OutcomeConsumer, OutcomeNotification, OutcomeQueue,
};
use rebuild_core::models::{FileSubmission, ProcessingOutcome};
use rebuild_core::registry::CorrelationRouter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Runs an outcome consumer until dropped
struct BackgroundConsumer {
    shutdown: watch::Sender<bool>,
}

impl BackgroundConsumer {
    fn start(queue: Arc<InMemoryOutcomeQueue>, router: Arc<CorrelationRouter>) -> Self {
        let (shutdown, rx) = watch::channel(false);
        let config = MessagingConfig {
            poll_interval_ms: 5,
            ..MessagingConfig::default()
        };
        let queue: Arc<dyn OutcomeQueue> = queue;
        let consumer = OutcomeConsumer::new(queue, router, &config);
        tokio::spawn(async move { consumer.run_until(rx).await });
        Self { shutdown }
    }
}

impl Drop for BackgroundConsumer {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

fn coordinator(router: &Arc<CorrelationRouter>, ingestor: Arc<dyn Ingestor>, timeout: Duration) -> SubmissionCoordinator {
    SubmissionCoordinator::new(
        Arc::clone(router),
        ingestor,
        &MessagingConfig::default(),
        &CoordinatorConfig::default(),
    )
    .with_outcome_timeout(timeout)
}

#[tokio::test]
async fn test_directory_submission_collects_every_outcome() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.pdf"), b"%PDF-1.7 alpha").unwrap();
    std::fs::write(dir.path().join("b.pdf"), b"%PDF-1.7 beta").unwrap();
    std::fs::write(dir.path().join("c.pdf"), b"%PDF-1.7 alpha").unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();

    let source: Arc<dyn ContentSource> = Arc::new(FileContentSource::new());
    let pipeline = PipelineBuilder::default().file_type("Pdf").build_with_source(Some(source));
    let router = Arc::new(CorrelationRouter::default());
    let _consumer = BackgroundConsumer::start(Arc::clone(&pipeline.queue), Arc::clone(&router));

    let report = coordinator(&router, Arc::new(pipeline.host.clone()), Duration::from_secs(10))
        .submit_directory(dir.path())
        .await
        .unwrap();

    assert!(report.is_complete(), "incomplete report: {report:?}");
    assert_eq!(report.outcomes.len(), 3);
    for file_id in ["a.pdf", "b.pdf", "c.pdf"] {
        let outcome = report.outcome_for(file_id).unwrap();
        assert_eq!(outcome.parsed_outcome(), Some(ProcessingOutcome::Rebuilt));
        assert!(outcome.rebuilt_locator.contains("rebuild-store/"));
    }
    // a.pdf and c.pdf share content and therefore an artifact
    assert_eq!(
        report.outcome_for("a.pdf").unwrap().rebuilt_locator,
        report.outcome_for("c.pdf").unwrap().rebuilt_locator
    );
    assert!(router.is_empty());
}

#[tokio::test]
async fn test_outcomes_that_never_arrive_are_reported_outstanding() {
    let pipeline = PipelineBuilder::default().build();
    pipeline.content.insert("a.pdf", b"%PDF".to_vec());
    pipeline.content.insert("b.pdf", b"%PDF-2".to_vec());
    let router = Arc::new(CorrelationRouter::default());
    // No consumer: notifications stay on the queue

    let report = coordinator(&router, Arc::new(pipeline.host.clone()), Duration::from_millis(200))
        .submit_all(vec![
            FileSubmission::new("a.pdf", "a.pdf"),
            FileSubmission::new("b.pdf", "b.pdf"),
        ])
        .await;

    assert!(!report.is_complete());
    assert!(report.outcomes.is_empty());
    assert_eq!(report.outstanding, vec!["a.pdf".to_string(), "b.pdf".to_string()]);
    assert!(report.failed_ingestions.is_empty());
    assert!(router.is_empty(), "timed-out listeners must be unregistered");
}

/// Ingestor that publishes a canned notification instead of running a workflow
struct CannedIngestor {
    queue: Arc<InMemoryOutcomeQueue>,
    reject: &'static str,
}

#[async_trait]
impl Ingestor for CannedIngestor {
    async fn ingest(&self, submission: &FileSubmission) -> CoordinatorResult<()> {
        if submission.id == self.reject {
            return Err(CoordinatorError::ingestion(&submission.id, "upload refused"));
        }
        // Outcome property deliberately omitted
        let notification = OutcomeNotification::new("transaction-outcome").with_property("file-id", submission.id.as_str());
        self.queue
            .send(&notification)
            .await
            .map_err(|e| CoordinatorError::ingestion(&submission.id, e.to_string()))?;
        Ok(())
    }
}

#[tokio::test]
async fn test_missing_properties_are_reported_as_missing_outcome() {
    let queue = Arc::new(InMemoryOutcomeQueue::new("transaction-outcome"));
    let router = Arc::new(CorrelationRouter::default());
    let _consumer = BackgroundConsumer::start(Arc::clone(&queue), Arc::clone(&router));
    let ingestor = Arc::new(CannedIngestor {
        queue: Arc::clone(&queue),
        reject: "",
    });

    let report = coordinator(&router, ingestor, Duration::from_secs(5))
        .submit_all(vec![FileSubmission::new("odd.bin", "odd.bin")])
        .await;

    let outcome = report.outcome_for("odd.bin").unwrap();
    assert_eq!(outcome.outcome, "missing outcome");
    assert_eq!(outcome.rebuilt_locator, "missing outcome");
    assert_eq!(outcome.parsed_outcome(), None);
}

#[tokio::test]
async fn test_failed_and_duplicate_ingestions_do_not_block_the_batch() {
    let queue = Arc::new(InMemoryOutcomeQueue::new("transaction-outcome"));
    let router = Arc::new(CorrelationRouter::default());
    let _consumer = BackgroundConsumer::start(Arc::clone(&queue), Arc::clone(&router));
    let ingestor = Arc::new(CannedIngestor {
        queue: Arc::clone(&queue),
        reject: "refused.pdf",
    });

    let report = coordinator(&router, ingestor, Duration::from_secs(5))
        .submit_all(vec![
            FileSubmission::new("ok.pdf", "ok.pdf"),
            FileSubmission::new("refused.pdf", "refused.pdf"),
            FileSubmission::new("ok.pdf", "copy/ok.pdf"),
        ])
        .await;

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].file_id, "ok.pdf");
    assert!(report.outstanding.is_empty());
    let failed: Vec<&str> = report.failed_ingestions.iter().map(|f| f.file_id.as_str()).collect();
    assert_eq!(failed, vec!["ok.pdf", "refused.pdf"]);
    assert!(report.failed_ingestions[0].reason.contains("duplicate"));
    assert!(report.failed_ingestions[1].reason.contains("upload refused"));
    assert!(router.is_empty());
}

#[tokio::test]
async fn test_unreadable_directory_is_an_error() {
    let router = Arc::new(CorrelationRouter::default());
    let queue = Arc::new(InMemoryOutcomeQueue::new("transaction-outcome"));
    let ingestor = Arc::new(CannedIngestor { queue, reject: "" });

    let err = coordinator(&router, ingestor, Duration::from_secs(1))
        .submit_directory(std::path::Path::new("/definitely/not/here"))
        .await
        .unwrap_err();

    assert!(matches!(err, CoordinatorError::Directory { .. }));
}

#[tokio::test]
async fn test_empty_batch_completes_immediately() {
    let router = Arc::new(CorrelationRouter::default());
    let queue = Arc::new(InMemoryOutcomeQueue::new("transaction-outcome"));
    let ingestor = Arc::new(CannedIngestor { queue, reject: "" });

    let report = tokio::time::timeout(
        Duration::from_millis(500),
        coordinator(&router, ingestor, Duration::from_secs(30)).submit_all(Vec::new()),
    )
    .await
    .unwrap();

    assert!(report.is_complete());
    assert!(report.outcomes.is_empty());
}

#[tokio::test]
async fn test_unreadable_file_reports_error_instead_of_timing_out() {
    let pipeline = PipelineBuilder::default().max_redrives(1).build();
    pipeline.content.insert("present.pdf", b"%PDF-1.7 here".to_vec());
    let router = Arc::new(CorrelationRouter::default());
    let _consumer = BackgroundConsumer::start(Arc::clone(&pipeline.queue), Arc::clone(&router));

    let report = coordinator(&router, Arc::new(pipeline.host.clone()), Duration::from_secs(10))
        .submit_all(vec![
            FileSubmission::new("present.pdf", "present.pdf"),
            FileSubmission::new("vanished.pdf", "vanished.pdf"),
        ])
        .await;

    assert!(report.is_complete(), "incomplete report: {report:?}");
    assert_eq!(
        report.outcome_for("present.pdf").unwrap().parsed_outcome(),
        Some(ProcessingOutcome::Rebuilt)
    );
    let vanished = report.outcome_for("vanished.pdf").unwrap();
    assert_eq!(vanished.parsed_outcome(), Some(ProcessingOutcome::Error));
    assert_eq!(vanished.rebuilt_locator, "");
}
