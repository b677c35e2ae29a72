//! # In-Memory Outcome Queue
//!
//! Thread-safe in-memory queue for tests and single-process deployments.
//!
//! - **Visibility timeout**: received notifications are hidden until settled or
//!   until the timeout lapses, then delivered again
//! - **Dead letters**: notifications nacked without requeue are kept aside for
//!   inspection instead of being dropped
//! - **Unreadable payloads**: payloads that fail to decode are moved aside on
//!   receive so they cannot block the rest of the queue

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::errors::{MessagingError, MessagingResult};
use super::message::OutcomeNotification;
use super::queue::{NotificationSender, OutcomeQueue, ReceivedNotification};
use super::types::{MessageId, ReceiptHandle};

#[derive(Debug, Clone)]
struct InMemoryQueuedMessage {
    id: u64,
    payload: Vec<u8>,
    enqueued_at: DateTime<Utc>,
    /// When the message becomes visible again (None = visible now)
    visible_at: Option<DateTime<Utc>>,
    receive_count: u32,
}

#[derive(Debug, Default)]
struct QueueState {
    messages: VecDeque<InMemoryQueuedMessage>,
    dead_letters: Vec<OutcomeNotification>,
    unreadable: Vec<Vec<u8>>,
}

/// Counters for an in-memory queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    pub message_count: u64,
    pub in_flight_count: u64,
    pub dead_letter_count: u64,
    pub unreadable_count: u64,
    pub total_sent: u64,
    pub total_received: u64,
    pub total_acked: u64,
    pub total_nacked: u64,
}

#[derive(Debug)]
pub struct InMemoryOutcomeQueue {
    name: String,
    state: RwLock<QueueState>,
    next_id: AtomicU64,
    total_sent: AtomicU64,
    total_received: AtomicU64,
    total_acked: AtomicU64,
    total_nacked: AtomicU64,
}

impl InMemoryOutcomeQueue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(QueueState::default()),
            next_id: AtomicU64::new(1),
            total_sent: AtomicU64::new(0),
            total_received: AtomicU64::new(0),
            total_acked: AtomicU64::new(0),
            total_nacked: AtomicU64::new(0),
        }
    }

    /// Number of notifications not yet acked or dead-lettered (for testing)
    pub async fn queue_length(&self) -> usize {
        self.state.read().await.messages.len()
    }

    pub async fn dead_letters(&self) -> Vec<OutcomeNotification> {
        self.state.read().await.dead_letters.clone()
    }

    /// Raw payloads removed because they could not be decoded
    pub async fn unreadable_payloads(&self) -> Vec<Vec<u8>> {
        self.state.read().await.unreadable.clone()
    }

    pub async fn stats(&self) -> QueueStats {
        let state = self.state.read().await;
        let now = Utc::now();
        let in_flight_count = state
            .messages
            .iter()
            .filter(|m| m.visible_at.map(|vt| vt > now).unwrap_or(false))
            .count() as u64;

        QueueStats {
            message_count: state.messages.len() as u64,
            in_flight_count,
            dead_letter_count: state.dead_letters.len() as u64,
            unreadable_count: state.unreadable.len() as u64,
            total_sent: self.total_sent.load(Ordering::Relaxed),
            total_received: self.total_received.load(Ordering::Relaxed),
            total_acked: self.total_acked.load(Ordering::Relaxed),
            total_nacked: self.total_nacked.load(Ordering::Relaxed),
        }
    }

    fn message_id(&self, receipt_handle: &ReceiptHandle) -> MessagingResult<u64> {
        receipt_handle
            .as_u64()
            .ok_or_else(|| MessagingError::invalid_receipt_handle(receipt_handle.as_str()))
    }
}

#[async_trait]
impl NotificationSender for InMemoryOutcomeQueue {
    async fn send(&self, notification: &OutcomeNotification) -> MessagingResult<MessageId> {
        let payload = notification.to_bytes()?;

        let mut state = self.state.write().await;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.total_sent.fetch_add(1, Ordering::Relaxed);
        state.messages.push_back(InMemoryQueuedMessage {
            id,
            payload,
            enqueued_at: Utc::now(),
            visible_at: None,
            receive_count: 0,
        });

        debug!(queue = %self.name, message_id = id, label = %notification.label, "Notification enqueued");
        Ok(MessageId::from(id))
    }
}

#[async_trait]
impl OutcomeQueue for InMemoryOutcomeQueue {
    async fn receive(
        &self,
        max_messages: usize,
        visibility_timeout: Duration,
    ) -> MessagingResult<Vec<ReceivedNotification>> {
        let visibility = chrono::Duration::from_std(visibility_timeout).map_err(|e| {
            MessagingError::queue_operation(&self.name, "receive", format!("invalid visibility timeout: {e}"))
        })?;

        let mut guard = self.state.write().await;
        let QueueState {
            messages, unreadable, ..
        } = &mut *guard;
        let now = Utc::now();
        let visible_until = now + visibility;
        let mut received = Vec::new();
        let mut undecodable = Vec::new();

        for msg in messages.iter_mut() {
            if received.len() >= max_messages {
                break;
            }

            let is_visible = msg.visible_at.map(|vt| vt <= now).unwrap_or(true);
            if !is_visible {
                continue;
            }

            let notification = match OutcomeNotification::from_bytes(&msg.payload) {
                Ok(notification) => notification,
                Err(e) => {
                    warn!(queue = %self.name, message_id = msg.id, error = %e, "Undecodable payload moved aside");
                    undecodable.push(msg.id);
                    continue;
                }
            };
            msg.visible_at = Some(visible_until);
            msg.receive_count += 1;
            self.total_received.fetch_add(1, Ordering::Relaxed);

            received.push(ReceivedNotification {
                receipt_handle: ReceiptHandle::from(msg.id),
                notification,
                delivery_count: msg.receive_count,
                enqueued_at: msg.enqueued_at,
            });
        }

        if !undecodable.is_empty() {
            messages.retain(|msg| {
                if undecodable.contains(&msg.id) {
                    unreadable.push(msg.payload.clone());
                    false
                } else {
                    true
                }
            });
        }

        Ok(received)
    }

    async fn ack(&self, receipt_handle: &ReceiptHandle) -> MessagingResult<()> {
        let message_id = self.message_id(receipt_handle)?;

        let mut state = self.state.write().await;
        let pos = state
            .messages
            .iter()
            .position(|m| m.id == message_id)
            .ok_or_else(|| MessagingError::message_not_found(message_id.to_string()))?;
        state.messages.remove(pos);
        self.total_acked.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn nack(&self, receipt_handle: &ReceiptHandle, requeue: bool) -> MessagingResult<()> {
        let message_id = self.message_id(receipt_handle)?;

        let mut state = self.state.write().await;
        let pos = state
            .messages
            .iter()
            .position(|m| m.id == message_id)
            .ok_or_else(|| MessagingError::message_not_found(message_id.to_string()))?;
        self.total_nacked.fetch_add(1, Ordering::Relaxed);

        if requeue {
            if let Some(msg) = state.messages.get_mut(pos) {
                msg.visible_at = None;
            }
        } else if let Some(msg) = state.messages.remove(pos) {
            let notification = OutcomeNotification::from_bytes(&msg.payload)?;
            state.dead_letters.push(notification);
            debug!(queue = %self.name, message_id, "Notification dead-lettered");
        }
        Ok(())
    }

    fn queue_name(&self) -> &str {
        &self.name
    }
}
