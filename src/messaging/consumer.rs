//! # Outcome Consumer
//!
//! Polls the outcome queue and settles each notification according to the
//! correlation router's decision.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::errors::MessagingResult;
use super::queue::{OutcomeQueue, ReceivedNotification};
use crate::config::MessagingConfig;
use crate::registry::{CorrelationRouter, DispatchDecision};

/// Counts from one polling pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsumerStats {
    pub received: usize,
    pub acked: usize,
    pub nacked: usize,
    pub ignored: usize,
    pub dead_lettered: usize,
}

impl ConsumerStats {
    fn merge(&mut self, other: ConsumerStats) {
        self.received += other.received;
        self.acked += other.acked;
        self.nacked += other.nacked;
        self.ignored += other.ignored;
        self.dead_lettered += other.dead_lettered;
    }
}

pub struct OutcomeConsumer {
    queue: Arc<dyn OutcomeQueue>,
    router: Arc<CorrelationRouter>,
    batch_size: usize,
    visibility_timeout: Duration,
    poll_interval: Duration,
    max_delivery_count: u32,
}

impl OutcomeConsumer {
    pub fn new(queue: Arc<dyn OutcomeQueue>, router: Arc<CorrelationRouter>, config: &MessagingConfig) -> Self {
        Self {
            queue,
            router,
            batch_size: config.batch_size.max(1),
            visibility_timeout: config.visibility_timeout(),
            poll_interval: config.poll_interval(),
            max_delivery_count: config.max_delivery_count.max(1),
        }
    }

    /// Receive one batch and settle every notification in it
    pub async fn poll_once(&self) -> MessagingResult<ConsumerStats> {
        let batch = self
            .queue
            .receive(self.batch_size, self.visibility_timeout)
            .await?;

        let mut stats = ConsumerStats {
            received: batch.len(),
            ..ConsumerStats::default()
        };
        for received in batch {
            self.settle(received, &mut stats).await?;
        }
        Ok(stats)
    }

    async fn settle(&self, received: ReceivedNotification, stats: &mut ConsumerStats) -> MessagingResult<()> {
        match self.router.dispatch(&received.notification) {
            DispatchDecision::Ack => {
                self.queue.ack(&received.receipt_handle).await?;
                stats.acked += 1;
            }
            DispatchDecision::Ignore => {
                // Left invisible until the visibility timeout lapses, for other consumers
                stats.ignored += 1;
            }
            DispatchDecision::Nack if received.delivery_count >= self.max_delivery_count => {
                warn!(
                    queue = %self.queue.queue_name(),
                    receipt = %received.receipt_handle,
                    delivery_count = received.delivery_count,
                    "Delivery limit reached, dead-lettering notification"
                );
                self.queue.nack(&received.receipt_handle, false).await?;
                stats.dead_lettered += 1;
            }
            DispatchDecision::Nack => {
                self.queue.nack(&received.receipt_handle, true).await?;
                stats.nacked += 1;
            }
        }
        Ok(())
    }

    /// Poll until `shutdown` turns true, returning the accumulated counts
    pub async fn run_until(&self, mut shutdown: watch::Receiver<bool>) -> ConsumerStats {
        info!(queue = %self.queue.queue_name(), "🚀 Outcome consumer started");
        let mut totals = ConsumerStats::default();

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.poll_once().await {
                Ok(stats) => {
                    if stats.received > 0 {
                        debug!(queue = %self.queue.queue_name(), ?stats, "Polling pass complete");
                    }
                    totals.merge(stats);
                }
                Err(e) => {
                    error!(queue = %self.queue.queue_name(), error = %e, "Polling pass failed");
                }
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!(queue = %self.queue.queue_name(), ?totals, "🛑 Outcome consumer stopped");
        totals
    }
}
