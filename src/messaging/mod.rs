//! # Messaging
//!
//! Outcome notifications: the wire message, the queue abstraction with an
//! in-memory provider, the signaler used by workflows to publish outcomes, and
//! the consumer that feeds received notifications to the correlation router.

pub mod consumer;
pub mod errors;
pub mod in_memory;
pub mod message;
pub mod queue;
pub mod signaler;
pub mod types;

pub use consumer::{ConsumerStats, OutcomeConsumer};
pub use errors::{MessagingError, MessagingResult};
pub use in_memory::{InMemoryOutcomeQueue, QueueStats};
pub use message::OutcomeNotification;
pub use queue::{NotificationSender, OutcomeQueue, ReceivedNotification};
pub use signaler::OutcomeSignaler;
pub use types::{MessageId, ReceiptHandle};
