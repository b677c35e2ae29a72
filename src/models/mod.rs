//! Core data types shared by the workflow, the cache and the outcome wire contract.

pub mod outcome;
pub mod submission;

pub use outcome::{ProcessingOutcome, RebuildResult};
pub use submission::FileSubmission;
