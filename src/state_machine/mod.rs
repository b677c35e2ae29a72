//! # Workflow State Machine
//!
//! States of a file processing workflow and the legal transitions between them.

pub mod machine;
pub mod states;

pub use machine::WorkflowStateMachine;
pub use states::WorkflowState;
