use thiserror::Error;
use uuid::Uuid;

use crate::hashing::HashingError;
use crate::messaging::MessagingError;
use crate::state_machine::WorkflowState;

/// Errors that fault a workflow instance
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Hashing failed: {0}")]
    Hashing(#[from] HashingError),

    #[error("Outcome signaling failed: {0}")]
    Signaling(#[from] MessagingError),

    #[error("Step store error during {operation}: {message}")]
    StepStore { operation: String, message: String },

    /// The recorded history disagrees with the step the workflow asked for
    #[error("Workflow {instance_id} diverged at step {step_index}: recorded '{recorded}', requested '{requested}'")]
    NonDeterministic {
        instance_id: Uuid,
        step_index: u32,
        recorded: String,
        requested: String,
    },

    #[error("Step record {step_index} ('{step_name}') of workflow {instance_id} is unreadable: {message}")]
    CorruptStepRecord {
        instance_id: Uuid,
        step_index: u32,
        step_name: String,
        message: String,
    },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: WorkflowState, to: WorkflowState },

    #[error("Workflow {instance_id} abandoned after {attempts} attempts: {last_error}")]
    Abandoned {
        instance_id: Uuid,
        attempts: u32,
        last_error: String,
    },
}

impl WorkflowError {
    pub fn step_store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StepStore {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Check if re-entering the instance could succeed
    ///
    /// Divergent or corrupt histories and invalid transitions replay identically,
    /// so re-driving them is pointless.
    pub fn is_redrivable(&self) -> bool {
        matches!(
            self,
            Self::Hashing(_) | Self::Signaling(_) | Self::StepStore { .. }
        )
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
