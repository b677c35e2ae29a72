use std::sync::Arc;
use uuid::Uuid;

use crate::messaging::OutcomeNotification;

/// Receives notifications routed to a registration
///
/// Returns `true` when the notification was processed. Processed registrations
/// are removed from the router.
pub trait OutcomeListener: Send + Sync {
    fn on_notification(&self, notification: &OutcomeNotification) -> bool;
}

impl<F> OutcomeListener for F
where
    F: Fn(&OutcomeNotification) -> bool + Send + Sync,
{
    fn on_notification(&self, notification: &OutcomeNotification) -> bool {
        self(notification)
    }
}

/// A listener waiting for one correlation id of one message type
#[derive(Clone)]
pub struct ListenerRegistration {
    pub registration_id: Uuid,
    pub message_type: String,
    pub correlation_id: String,
    pub listener: Arc<dyn OutcomeListener>,
}

impl ListenerRegistration {
    pub fn new(
        message_type: impl Into<String>,
        correlation_id: impl Into<String>,
        listener: Arc<dyn OutcomeListener>,
    ) -> Self {
        Self {
            registration_id: Uuid::new_v4(),
            message_type: message_type.into(),
            correlation_id: correlation_id.into(),
            listener,
        }
    }
}

impl std::fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("registration_id", &self.registration_id)
            .field("message_type", &self.message_type)
            .field("correlation_id", &self.correlation_id)
            .field("listener", &"<Arc<dyn OutcomeListener>>")
            .finish()
    }
}
