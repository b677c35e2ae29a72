use uuid::Uuid;

use super::states::WorkflowState;
use crate::logging::log_workflow_transition;
use crate::orchestration::{WorkflowError, WorkflowResult};

/// Tracks the state of one workflow run and rejects illegal transitions
#[derive(Debug, Clone)]
pub struct WorkflowStateMachine {
    instance_id: Uuid,
    state: WorkflowState,
    history: Vec<WorkflowState>,
}

impl WorkflowStateMachine {
    pub fn new(instance_id: Uuid) -> Self {
        Self {
            instance_id,
            state: WorkflowState::Hashing,
            history: vec![WorkflowState::Hashing],
        }
    }

    pub fn current_state(&self) -> WorkflowState {
        self.state
    }

    /// States visited so far, in order
    pub fn history(&self) -> &[WorkflowState] {
        &self.history
    }

    pub fn transition(&mut self, next: WorkflowState) -> WorkflowResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(WorkflowError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        log_workflow_transition(self.instance_id, self.state, next);
        self.state = next;
        self.history.push(next);
        Ok(())
    }
}
