use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use super::errors::MessagingResult;
use super::message::OutcomeNotification;
use super::types::{MessageId, ReceiptHandle};

/// Publishes outcome notifications
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &OutcomeNotification) -> MessagingResult<MessageId>;
}

/// A notification checked out from the queue, awaiting settlement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedNotification {
    pub receipt_handle: ReceiptHandle,
    pub notification: OutcomeNotification,
    /// Number of times this notification has been delivered, including this one
    pub delivery_count: u32,
    pub enqueued_at: DateTime<Utc>,
}

/// Queue of outcome notifications with explicit settlement
///
/// A received notification stays invisible to other receivers until it is acked,
/// nacked, or its visibility timeout lapses.
#[async_trait]
pub trait OutcomeQueue: NotificationSender {
    async fn receive(
        &self,
        max_messages: usize,
        visibility_timeout: Duration,
    ) -> MessagingResult<Vec<ReceivedNotification>>;

    /// Remove the notification permanently
    async fn ack(&self, receipt_handle: &ReceiptHandle) -> MessagingResult<()>;

    /// Return the notification for redelivery (`requeue`) or dead-letter it
    async fn nack(&self, receipt_handle: &ReceiptHandle, requeue: bool) -> MessagingResult<()>;

    fn queue_name(&self) -> &str;
}
