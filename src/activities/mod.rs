//! # Workflow Activities
//!
//! Clients for the external services the workflow calls: file type
//! classification, file rebuild, and access locator issuing. The clients never
//! surface errors to the workflow. Each maps its failures onto a value the
//! workflow understands (`"Error"` for classification, [`RebuildResult`] for
//! rebuilds) after applying its retry policy.
//!
//! [`RebuildResult`]: crate::models::RebuildResult

pub mod classifier;
pub mod errors;
pub mod http;
pub mod locator;
pub mod rebuilder;

pub use classifier::{FileTypeClassifier, HttpFileTypeClassifier};
pub use errors::{ActivityError, ActivityResult};
pub use http::TransientFailurePolicy;
pub use locator::{LocatorIssuer, LocatorPermissions, TemplateLocatorIssuer};
pub use rebuilder::{FileRebuilder, HttpFileRebuilder};
