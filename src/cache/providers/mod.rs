pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::{InMemoryCacheStats, InMemoryOutcomeCache};
#[cfg(feature = "postgres")]
pub use postgres::PgOutcomeCache;
