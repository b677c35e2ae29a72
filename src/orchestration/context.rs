//! # Workflow Context
//!
//! Step sequencer handed to a workflow run. Each call to [`WorkflowContext::step`]
//! takes the next step index. If the step result store already holds a record for
//! that index the recorded output is returned and the activity is not invoked;
//! otherwise the activity runs and its output is recorded before returning.
//!
//! Workflow code must therefore be deterministic given its recorded history: the
//! same inputs must request the same steps in the same order. Wall-clock time is
//! only available through [`WorkflowContext::current_utc`], which is itself a
//! recorded step.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::errors::{WorkflowError, WorkflowResult};
use super::step_store::{StepRecord, StepResultStore};
use crate::constants::steps;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub struct WorkflowContext {
    instance_id: Uuid,
    store: Arc<dyn StepResultStore>,
    clock: Arc<dyn Clock>,
    next_step: u32,
    replayed_steps: u32,
    executed_steps: u32,
}

impl WorkflowContext {
    pub fn new(instance_id: Uuid, store: Arc<dyn StepResultStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            instance_id,
            store,
            clock,
            next_step: 0,
            replayed_steps: 0,
            executed_steps: 0,
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Steps answered from recorded history during this run
    pub fn replayed_steps(&self) -> u32 {
        self.replayed_steps
    }

    /// Steps whose activity actually ran during this run
    pub fn executed_steps(&self) -> u32 {
        self.executed_steps
    }

    /// Run `activity` as the next step, or return its recorded output on replay
    pub async fn step<T, F, Fut>(&mut self, name: &str, activity: F) -> WorkflowResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = WorkflowResult<T>>,
    {
        let step_index = self.next_step;

        if let Some(record) = self.store.load(self.instance_id, step_index).await? {
            if record.step_name != name {
                return Err(WorkflowError::NonDeterministic {
                    instance_id: self.instance_id,
                    step_index,
                    recorded: record.step_name,
                    requested: name.to_string(),
                });
            }
            let value = serde_json::from_value(record.output).map_err(|e| WorkflowError::CorruptStepRecord {
                instance_id: self.instance_id,
                step_index,
                step_name: name.to_string(),
                message: e.to_string(),
            })?;
            debug!(instance_id = %self.instance_id, step_index, step = %name, "Step replayed");
            self.next_step += 1;
            self.replayed_steps += 1;
            return Ok(value);
        }

        let value = activity().await?;
        let output = serde_json::to_value(&value).map_err(|e| WorkflowError::CorruptStepRecord {
            instance_id: self.instance_id,
            step_index,
            step_name: name.to_string(),
            message: e.to_string(),
        })?;
        self.store
            .record(
                self.instance_id,
                StepRecord {
                    step_index,
                    step_name: name.to_string(),
                    output,
                    recorded_at: self.clock.now(),
                },
            )
            .await?;

        debug!(instance_id = %self.instance_id, step_index, step = %name, "Step executed");
        self.next_step += 1;
        self.executed_steps += 1;
        Ok(value)
    }

    /// Current time, fixed at first execution and replayed thereafter
    pub async fn current_utc(&mut self) -> WorkflowResult<DateTime<Utc>> {
        let clock = Arc::clone(&self.clock);
        self.step(steps::CURRENT_UTC, || async move { Ok(clock.now()) })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::InMemoryStepResultStore;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn context(instance_id: Uuid, store: Arc<InMemoryStepResultStore>, at: DateTime<Utc>) -> WorkflowContext {
        WorkflowContext::new(instance_id, store, Arc::new(FixedClock(at)))
    }

    #[tokio::test]
    async fn test_step_runs_once_then_replays() {
        let store = Arc::new(InMemoryStepResultStore::new());
        let instance = Uuid::new_v4();
        let calls = AtomicU32::new(0);
        let now = Utc::now();

        for _ in 0..3 {
            let mut ctx = context(instance, Arc::clone(&store), now);
            let value: String = ctx
                .step("classify", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("Pdf".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "Pdf");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_current_utc_is_stable_across_replays() {
        let store = Arc::new(InMemoryStepResultStore::new());
        let instance = Uuid::new_v4();
        let first_time = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let later_time = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();

        let mut first = context(instance, Arc::clone(&store), first_time);
        assert_eq!(first.current_utc().await.unwrap(), first_time);

        let mut replay = context(instance, Arc::clone(&store), later_time);
        assert_eq!(replay.current_utc().await.unwrap(), first_time);
        assert_eq!(replay.replayed_steps(), 1);
        assert_eq!(replay.executed_steps(), 0);
    }

    #[tokio::test]
    async fn test_failed_step_is_not_recorded() {
        let store = Arc::new(InMemoryStepResultStore::new());
        let instance = Uuid::new_v4();

        let mut ctx = context(instance, Arc::clone(&store), Utc::now());
        let result: WorkflowResult<String> = ctx
            .step("signal_outcome", || async {
                Err(WorkflowError::step_store("send", "queue unavailable"))
            })
            .await;
        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_divergent_history_is_detected() {
        let store = Arc::new(InMemoryStepResultStore::new());
        let instance = Uuid::new_v4();

        let mut ctx = context(instance, Arc::clone(&store), Utc::now());
        ctx.step("classify", || async { Ok(1u32) }).await.unwrap();

        let mut replay = context(instance, Arc::clone(&store), Utc::now());
        let err = replay
            .step("rebuild", || async { Ok(2u32) })
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NonDeterministic { step_index: 0, .. }));
    }
}
