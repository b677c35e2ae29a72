//! # Registry
//!
//! Listener registration and correlation-based dispatch of outcome notifications.

pub mod correlation_router;
pub mod listener;

pub use correlation_router::{CorrelationRouter, DispatchDecision};
pub use listener::{ListenerRegistration, OutcomeListener};
