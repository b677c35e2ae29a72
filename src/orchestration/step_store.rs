//! # Step Result Store
//!
//! Durable, append-only history of completed workflow steps, keyed by
//! (instance id, step index). Replaying a workflow reads this history instead of
//! repeating the work.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{WorkflowError, WorkflowResult};

/// Output of one completed step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step_index: u32,
    pub step_name: String,
    pub output: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

#[async_trait]
pub trait StepResultStore: Send + Sync {
    async fn load(&self, instance_id: Uuid, step_index: u32) -> WorkflowResult<Option<StepRecord>>;

    /// Append a record. A record already stored at the same index is kept; a
    /// record at that index under a different step name is an error.
    async fn record(&self, instance_id: Uuid, record: StepRecord) -> WorkflowResult<()>;

    /// All records of an instance in step order
    async fn history(&self, instance_id: Uuid) -> WorkflowResult<Vec<StepRecord>>;

    /// Drop the history of a finished instance
    async fn purge(&self, instance_id: Uuid) -> WorkflowResult<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryStepResultStore {
    records: DashMap<(Uuid, u32), StepRecord>,
}

impl InMemoryStepResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl StepResultStore for InMemoryStepResultStore {
    async fn load(&self, instance_id: Uuid, step_index: u32) -> WorkflowResult<Option<StepRecord>> {
        Ok(self
            .records
            .get(&(instance_id, step_index))
            .map(|record| record.value().clone()))
    }

    async fn record(&self, instance_id: Uuid, record: StepRecord) -> WorkflowResult<()> {
        use dashmap::mapref::entry::Entry;

        match self.records.entry((instance_id, record.step_index)) {
            Entry::Occupied(existing) if existing.get().step_name != record.step_name => {
                Err(WorkflowError::NonDeterministic {
                    instance_id,
                    step_index: record.step_index,
                    recorded: existing.get().step_name.clone(),
                    requested: record.step_name,
                })
            }
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn history(&self, instance_id: Uuid) -> WorkflowResult<Vec<StepRecord>> {
        let mut records: Vec<StepRecord> = self
            .records
            .iter()
            .filter(|entry| entry.key().0 == instance_id)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.step_index);
        Ok(records)
    }

    async fn purge(&self, instance_id: Uuid) -> WorkflowResult<()> {
        self.records.retain(|(id, _), _| *id != instance_id);
        Ok(())
    }
}
