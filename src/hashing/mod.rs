//! # Content Hashing
//!
//! Computes the SHA-256 fingerprint that keys the outcome cache and names the
//! rebuilt artifact. Content is streamed from a [`ContentSource`] so large files
//! never need to be buffered whole.

pub mod errors;
pub mod fingerprint;
pub mod hasher;
pub mod source;

pub use errors::{HashingError, HashingResult};
pub use fingerprint::ContentFingerprint;
pub use hasher::{hash_bytes, ContentHasher};
pub use source::{ContentReader, ContentSource, FileContentSource, InMemoryContentSource};
