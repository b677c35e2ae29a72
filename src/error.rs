use thiserror::Error;

use crate::activities::ActivityError;
use crate::cache::CacheError;
use crate::config::ConfigurationError;
use crate::coordinator::CoordinatorError;
use crate::hashing::HashingError;
use crate::messaging::MessagingError;
use crate::orchestration::WorkflowError;

/// Crate-level error covering every subsystem of the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Hashing error: {0}")]
    Hashing(#[from] HashingError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Activity error: {0}")]
    Activity(#[from] ActivityError),

    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
