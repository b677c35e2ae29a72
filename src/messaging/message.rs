//! # Outcome Notification
//!
//! The message published when a workflow finishes. External consumers read it
//! through string properties, so every field is carried as text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::errors::{MessagingError, MessagingResult};
use crate::constants::wire;
use crate::models::ProcessingOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeNotification {
    /// Message type used by listeners to select notifications
    pub label: String,
    pub properties: BTreeMap<String, String>,
}

impl OutcomeNotification {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Notification for a finished file.
    ///
    /// The rebuilt locator is only carried for `Rebuilt` outcomes; every other
    /// outcome publishes an empty locator property.
    pub fn transaction_outcome(
        label: impl Into<String>,
        file_id: &str,
        outcome: ProcessingOutcome,
        rebuilt_locator: Option<&str>,
    ) -> Self {
        let locator = if outcome.has_artifact() {
            rebuilt_locator.unwrap_or_default()
        } else {
            ""
        };
        Self::new(label)
            .with_property(wire::FILE_ID_PROPERTY, file_id)
            .with_property(wire::FILE_OUTCOME_PROPERTY, outcome.as_str())
            .with_property(wire::FILE_REBUILD_LOCATOR_PROPERTY, locator)
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Property value, or `"missing outcome"` when the notification lacks it
    pub fn property_or_missing(&self, key: &str) -> &str {
        self.property(key).unwrap_or(wire::MISSING_PROPERTY_VALUE)
    }

    pub fn file_id(&self) -> Option<&str> {
        self.property(wire::FILE_ID_PROPERTY)
    }

    pub fn outcome(&self) -> Option<ProcessingOutcome> {
        self.property(wire::FILE_OUTCOME_PROPERTY)?.parse().ok()
    }

    /// Rebuilt artifact locator, when a non-empty one was published
    pub fn rebuilt_locator(&self) -> Option<&str> {
        self.property(wire::FILE_REBUILD_LOCATOR_PROPERTY)
            .filter(|locator| !locator.is_empty())
    }

    pub fn to_bytes(&self) -> MessagingResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| MessagingError::message_serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> MessagingResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| MessagingError::message_deserialization(e.to_string()))
    }
}
