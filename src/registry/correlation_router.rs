//! # Correlation Router
//!
//! Routes inbound outcome notifications to the listeners waiting for them.
//!
//! Dispatch runs in two filters. The first selects registrations whose message
//! type equals the notification label; when none exist the notification is
//! ignored and left for another consumer. The second selects, among those, the
//! registrations whose correlation id equals the notification's identity
//! property. Every selected listener is invoked. The notification is acked if any
//! listener processed it and returned for redelivery otherwise.
//!
//! Listeners are invoked without the registry lock held, so a listener may
//! register or unregister other listeners.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::listener::{ListenerRegistration, OutcomeListener};
use crate::constants::wire;
use crate::messaging::OutcomeNotification;

/// Settlement the consumer should apply to a dispatched notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchDecision {
    /// A listener processed the notification; remove it from the queue
    Ack,
    /// No listener is interested in this message type; leave it alone
    Ignore,
    /// Listeners exist for the type but none processed it; return for redelivery
    Nack,
}

#[derive(Debug)]
pub struct CorrelationRouter {
    identity_key: String,
    registrations: RwLock<Vec<ListenerRegistration>>,
}

impl Default for CorrelationRouter {
    fn default() -> Self {
        Self::new(wire::FILE_ID_PROPERTY)
    }
}

impl CorrelationRouter {
    /// Router matching correlation ids against the `identity_key` property
    pub fn new(identity_key: impl Into<String>) -> Self {
        Self {
            identity_key: identity_key.into(),
            registrations: RwLock::new(Vec::new()),
        }
    }

    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    pub fn register(
        &self,
        message_type: impl Into<String>,
        correlation_id: impl Into<String>,
        listener: Arc<dyn OutcomeListener>,
    ) -> Uuid {
        let registration = ListenerRegistration::new(message_type, correlation_id, listener);
        let registration_id = registration.registration_id;
        debug!(
            registration_id = %registration_id,
            message_type = %registration.message_type,
            correlation_id = %registration.correlation_id,
            "Listener registered"
        );
        self.registrations.write().push(registration);
        registration_id
    }

    pub fn unregister(&self, registration_id: Uuid) -> bool {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|r| r.registration_id != registration_id);
        before != registrations.len()
    }

    /// Remove every registration for a correlation id, returning how many were removed
    pub fn unregister_correlation(&self, message_type: &str, correlation_id: &str) -> usize {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|r| !(r.message_type == message_type && r.correlation_id == correlation_id));
        before - registrations.len()
    }

    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }

    pub fn is_registered(&self, message_type: &str, correlation_id: &str) -> bool {
        self.registrations
            .read()
            .iter()
            .any(|r| r.message_type == message_type && r.correlation_id == correlation_id)
    }

    pub fn dispatch(&self, notification: &OutcomeNotification) -> DispatchDecision {
        let matched: Vec<(Uuid, Arc<dyn OutcomeListener>)> = {
            let registrations = self.registrations.read();

            let mut typed = registrations
                .iter()
                .filter(|r| r.message_type == notification.label)
                .peekable();
            if typed.peek().is_none() {
                debug!(label = %notification.label, "No listeners for message type, ignoring");
                return DispatchDecision::Ignore;
            }

            let Some(identity) = notification.property(&self.identity_key) else {
                warn!(
                    label = %notification.label,
                    identity_key = %self.identity_key,
                    "Notification has no identity property"
                );
                return DispatchDecision::Nack;
            };

            typed
                .filter(|r| r.correlation_id == identity)
                .map(|r| (r.registration_id, Arc::clone(&r.listener)))
                .collect()
        };

        if matched.is_empty() {
            debug!(
                label = %notification.label,
                identity = %notification.property_or_missing(&self.identity_key),
                "No listener for correlation id, returning for redelivery"
            );
            return DispatchDecision::Nack;
        }

        let processed: Vec<Uuid> = matched
            .into_iter()
            .filter(|(_, listener)| listener.on_notification(notification))
            .map(|(registration_id, _)| registration_id)
            .collect();

        if processed.is_empty() {
            debug!(label = %notification.label, "Listeners declined notification");
            return DispatchDecision::Nack;
        }

        self.registrations
            .write()
            .retain(|r| !processed.contains(&r.registration_id));

        info!(
            label = %notification.label,
            identity = %notification.property_or_missing(&self.identity_key),
            listeners = processed.len(),
            "✅ Notification processed"
        );
        DispatchDecision::Ack
    }
}
