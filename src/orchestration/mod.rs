//! # Orchestration Engine
//!
//! Replay-safe execution of the file processing workflow.
//!
//! ## Core Components
//!
//! - **WorkflowContext**: step sequencer that records each step's output and
//!   replays recorded outputs when an instance is re-entered
//! - **StepResultStore**: durable per-instance step history
//! - **FileProcessingOrchestrator**: the workflow itself, written as a straight
//!   sequence of recorded steps
//! - **WorkflowHost**: starts instances and re-drives faulted ones

pub mod context;
pub mod errors;
pub mod file_processing;
pub mod host;
pub mod step_store;

pub use context::{Clock, FixedClock, SystemClock, WorkflowContext};
pub use errors::{WorkflowError, WorkflowResult};
pub use file_processing::{
    locator_expiry, outcome_for_file_type, FileProcessingOrchestrator, WorkflowActivities,
    WorkflowSummary,
};
pub use host::WorkflowHost;
pub use step_store::{InMemoryStepResultStore, StepRecord, StepResultStore};
