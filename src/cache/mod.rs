//! # Outcome Cache
//!
//! Remembers the declared file type and terminal outcome per content fingerprint so
//! identical files are not classified and rebuilt twice.
//!
//! Cache faults never fail a workflow: the orchestrator treats a failed lookup as a
//! miss and a failed write as a skipped write-back.

pub mod entry;
pub mod errors;
pub mod providers;
pub mod traits;

pub use entry::CacheEntry;
pub use errors::{CacheError, CacheResult};
#[cfg(feature = "postgres")]
pub use providers::PgOutcomeCache;
pub use providers::{InMemoryCacheStats, InMemoryOutcomeCache};
pub use traits::OutcomeCache;
