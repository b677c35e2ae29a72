//! # Resilience Module
//!
//! Bounded retries for the classification and rebuild service calls. A
//! [`RetryPolicy`] owns the attempt budget; callers pass the predicate that decides
//! which failures are worth another attempt and choose the fallback applied once the
//! budget is spent.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rebuild_core::resilience::RetryPolicy;
//!
//! # async fn example() {
//! let policy = RetryPolicy::new("classifier", 5);
//!
//! let file_type = policy
//!     .execute(
//!         |_attempt| async { Err::<String, String>("503".to_string()) },
//!         |error| error == "503",
//!     )
//!     .await
//!     .or_fallback(|_| "Error".to_string());
//! # }
//! ```

pub mod retry;

pub use retry::{RetryOutcome, RetryPolicy};
