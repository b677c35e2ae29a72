#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Rebuild Core
//!
//! Durable file processing: every submitted file is fingerprinted, classified
//! by an external service, rebuilt into a sanitized artifact where possible, and
//! the outcome is published as a notification correlated by file id.
//!
//! ## Architecture
//!
//! Each file runs as one replay-safe workflow instance. Every step's output is
//! recorded, so an instance that faults part-way is re-entered and resumes at
//! the first step that never completed. Outcomes are remembered per content
//! fingerprint; resubmitting identical content is answered from the cache
//! without calling the external services again.
//!
//! On the client side a [`coordinator::SubmissionCoordinator`] registers one
//! listener per file with a [`registry::CorrelationRouter`], ingests the batch,
//! and waits for the outcomes under one deadline.
//!
//! ## Module Organization
//!
//! - [`hashing`] - Streaming SHA-256 content fingerprints
//! - [`cache`] - Outcome cache keyed by fingerprint (in-memory and PostgreSQL)
//! - [`activities`] - Classifier and rebuilder HTTP clients, access locators
//! - [`resilience`] - Bounded retry with transient-failure classification
//! - [`orchestration`] - Replay context, the workflow and its host
//! - [`messaging`] - Outcome notifications, queue, signaler and consumer
//! - [`registry`] - Correlation routing of notifications to listeners
//! - [`coordinator`] - Batch submission and outcome collection
//! - [`config`] - Layered configuration (defaults, TOML, environment)
//! - [`state_machine`] - Workflow states and legal transitions
//! - [`error`] - Crate-level error type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rebuild_core::config::ConfigLoader;
//! use rebuild_core::messaging::InMemoryOutcomeQueue;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! rebuild_core::logging::init_structured_logging();
//!
//! let config = ConfigLoader::new().with_optional_file("config/rebuild.toml").load()?;
//! let queue = Arc::new(InMemoryOutcomeQueue::new(&config.messaging.outcome_queue));
//! println!("Outcomes publish to {}", config.messaging.outcome_queue);
//! # drop(queue);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod activities;
pub mod cache;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod error;
pub mod hashing;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod orchestration;
pub mod registry;
pub mod resilience;
pub mod state_machine;

pub use config::{ConfigLoader, PipelineConfig};
pub use coordinator::{SubmissionCoordinator, SubmissionReport};
pub use error::{PipelineError, Result};
pub use hashing::{ContentFingerprint, ContentHasher};
pub use models::{FileSubmission, ProcessingOutcome, RebuildResult};
pub use orchestration::{FileProcessingOrchestrator, WorkflowActivities, WorkflowHost};
pub use registry::{CorrelationRouter, DispatchDecision};
