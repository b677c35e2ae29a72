//! # Submission Coordinator
//!
//! Client-side batch submission: ingest files and wait for their outcome
//! notifications through the correlation router.

pub mod errors;
pub mod ingestor;
pub mod submission;

pub use errors::{CoordinatorError, CoordinatorResult};
pub use ingestor::Ingestor;
pub use submission::{FileOutcomeReport, IngestionFailure, SubmissionCoordinator, SubmissionReport};
