use std::sync::Arc;
use tracing::info;

use super::errors::MessagingResult;
use super::message::OutcomeNotification;
use super::queue::NotificationSender;
use super::types::MessageId;
use crate::models::ProcessingOutcome;

/// Publishes the terminal outcome of a file
#[derive(Clone)]
pub struct OutcomeSignaler {
    sender: Arc<dyn NotificationSender>,
    label: String,
}

impl std::fmt::Debug for OutcomeSignaler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeSignaler")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl OutcomeSignaler {
    pub fn new(sender: Arc<dyn NotificationSender>, label: impl Into<String>) -> Self {
        Self {
            sender,
            label: label.into(),
        }
    }

    pub async fn signal(
        &self,
        file_id: &str,
        outcome: ProcessingOutcome,
        rebuilt_locator: Option<&str>,
    ) -> MessagingResult<MessageId> {
        let notification =
            OutcomeNotification::transaction_outcome(&self.label, file_id, outcome, rebuilt_locator);
        let message_id = self.sender.send(&notification).await?;

        info!(
            file_id = %file_id,
            outcome = %outcome,
            message_id = %message_id,
            "📤 Outcome signaled"
        );
        Ok(message_id)
    }
}
