#![allow(dead_code)]

pub mod http_stub;
pub mod strategies;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use rebuild_core::activities::{FileRebuilder, FileTypeClassifier, TemplateLocatorIssuer};
use rebuild_core::cache::{CacheEntry, CacheError, CacheResult, InMemoryOutcomeCache, OutcomeCache};
use rebuild_core::config::{CacheConfig, OrchestrationConfig, StorageConfig};
use rebuild_core::hashing::{ContentFingerprint, ContentHasher, ContentSource, InMemoryContentSource};
use rebuild_core::messaging::{
    InMemoryOutcomeQueue, MessageId, MessagingError, MessagingResult, NotificationSender,
    OutcomeNotification, OutcomeSignaler,
};
use rebuild_core::models::RebuildResult;
use rebuild_core::orchestration::{
    FileProcessingOrchestrator, FixedClock, InMemoryStepResultStore, WorkflowActivities, WorkflowHost,
};

pub const BLOB_ENDPOINT: &str = "https://files.example.test";

pub fn fixed_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap()
}

/// Classifier returning one scripted answer and remembering every locator it saw
pub struct ScriptedClassifier {
    file_type: Mutex<String>,
    calls: AtomicU32,
    locators: Mutex<Vec<String>>,
}

impl ScriptedClassifier {
    pub fn new(file_type: &str) -> Arc<Self> {
        Arc::new(Self {
            file_type: Mutex::new(file_type.to_string()),
            calls: AtomicU32::new(0),
            locators: Mutex::new(Vec::new()),
        })
    }

    pub fn set_file_type(&self, file_type: &str) {
        *self.file_type.lock() = file_type.to_string();
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn locators(&self) -> Vec<String> {
        self.locators.lock().clone()
    }
}

#[async_trait]
impl FileTypeClassifier for ScriptedClassifier {
    async fn classify(&self, content_locator: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.locators.lock().push(content_locator.to_string());
        self.file_type.lock().clone()
    }
}

/// Rebuilder returning one scripted result and remembering its locator pairs
pub struct ScriptedRebuilder {
    result: Mutex<RebuildResult>,
    calls: AtomicU32,
    requests: Mutex<Vec<(String, String, String)>>,
}

impl ScriptedRebuilder {
    pub fn new(result: RebuildResult) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(result),
            calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// (source, destination, declared type) per call
    pub fn requests(&self) -> Vec<(String, String, String)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl FileRebuilder for ScriptedRebuilder {
    async fn rebuild(&self, source_locator: &str, destination_locator: &str, declared_file_type: &str) -> RebuildResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push((
            source_locator.to_string(),
            destination_locator.to_string(),
            declared_file_type.to_string(),
        ));
        *self.result.lock()
    }
}

/// Cache whose backend is always down
#[derive(Debug, Default)]
pub struct UnavailableCache {
    pub lookups: AtomicU32,
    pub writes: AtomicU32,
}

#[async_trait]
impl OutcomeCache for UnavailableCache {
    async fn lookup(&self, _namespace: &str, _fingerprint: &ContentFingerprint) -> CacheResult<Option<CacheEntry>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn upsert(&self, _entry: &CacheEntry) -> CacheResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "unavailable"
    }
}

/// Sender that fails its first `failures` sends before forwarding to the queue
pub struct FlakySender {
    inner: Arc<InMemoryOutcomeQueue>,
    remaining_failures: AtomicU32,
    attempts: AtomicU32,
}

impl FlakySender {
    pub fn new(inner: Arc<InMemoryOutcomeQueue>, failures: u32) -> Arc<Self> {
        Arc::new(Self {
            inner,
            remaining_failures: AtomicU32::new(failures),
            attempts: AtomicU32::new(0),
        })
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSender for FlakySender {
    async fn send(&self, notification: &OutcomeNotification) -> MessagingResult<MessageId> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(MessagingError::queue_operation("outcomes", "send", "broker unavailable"));
        }
        self.inner.send(notification).await
    }
}

/// Everything one pipeline needs, wired with in-memory backends
pub struct Pipeline {
    pub content: Arc<InMemoryContentSource>,
    pub cache: Arc<InMemoryOutcomeCache>,
    pub queue: Arc<InMemoryOutcomeQueue>,
    pub store: Arc<InMemoryStepResultStore>,
    pub classifier: Arc<ScriptedClassifier>,
    pub rebuilder: Arc<ScriptedRebuilder>,
    pub orchestrator: Arc<FileProcessingOrchestrator>,
    pub host: WorkflowHost,
}

pub struct PipelineBuilder {
    file_type: String,
    rebuild_result: RebuildResult,
    cache: Option<Arc<dyn OutcomeCache>>,
    sender_failures: u32,
    max_redrives: u32,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            file_type: "Pdf".to_string(),
            rebuild_result: RebuildResult::Rebuilt,
            cache: None,
            sender_failures: 0,
            max_redrives: 3,
        }
    }
}

impl PipelineBuilder {
    pub fn file_type(mut self, file_type: &str) -> Self {
        self.file_type = file_type.to_string();
        self
    }

    pub fn rebuild_result(mut self, result: RebuildResult) -> Self {
        self.rebuild_result = result;
        self
    }

    pub fn cache(mut self, cache: Arc<dyn OutcomeCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn failing_sends(mut self, failures: u32) -> Self {
        self.sender_failures = failures;
        self
    }

    pub fn max_redrives(mut self, max_redrives: u32) -> Self {
        self.max_redrives = max_redrives;
        self
    }

    pub fn build(self) -> Pipeline {
        self.build_with_source(None)
    }

    pub fn build_with_source(self, source: Option<Arc<dyn ContentSource>>) -> Pipeline {
        let content = Arc::new(InMemoryContentSource::new());
        let memory_cache = Arc::new(InMemoryOutcomeCache::new());
        let queue = Arc::new(InMemoryOutcomeQueue::new("transaction-outcome"));
        let store = Arc::new(InMemoryStepResultStore::new());
        let classifier = ScriptedClassifier::new(&self.file_type);
        let rebuilder = ScriptedRebuilder::new(self.rebuild_result);

        let sender: Arc<dyn NotificationSender> = if self.sender_failures > 0 {
            FlakySender::new(Arc::clone(&queue), self.sender_failures) as Arc<dyn NotificationSender>
        } else {
            queue.clone() as Arc<dyn NotificationSender>
        };
        let source = source.unwrap_or_else(|| content.clone() as Arc<dyn ContentSource>);
        let cache = self
            .cache
            .unwrap_or_else(|| memory_cache.clone() as Arc<dyn OutcomeCache>);

        let activities = WorkflowActivities {
            hasher: Arc::new(ContentHasher::new(source)),
            cache,
            classifier: classifier.clone(),
            rebuilder: rebuilder.clone(),
            locators: Arc::new(TemplateLocatorIssuer::new(BLOB_ENDPOINT)),
            signaler: OutcomeSignaler::new(sender, "transaction-outcome"),
        };
        let storage = StorageConfig {
            blob_endpoint: BLOB_ENDPOINT.to_string(),
            ..StorageConfig::default()
        };
        let orchestrator = Arc::new(FileProcessingOrchestrator::new(
            activities,
            storage,
            &CacheConfig::default(),
        ));
        let orchestration = OrchestrationConfig {
            max_redrives: self.max_redrives,
            redrive_backoff_ms: 0,
        };
        let host = WorkflowHost::new(
            Arc::clone(&orchestrator),
            store.clone(),
            Arc::new(FixedClock(fixed_start())),
            &orchestration,
        );

        Pipeline {
            content,
            cache: memory_cache,
            queue,
            store,
            classifier,
            rebuilder,
            orchestrator,
            host,
        }
    }
}
