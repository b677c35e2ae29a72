use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle states of a file processing workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Fingerprinting the file content
    Hashing,
    /// Looking for a remembered outcome
    CacheLookup,
    /// A usable cache entry was found
    CacheHit,
    /// Asking the classification service for the file type
    Classifying,
    /// Rebuild not needed; the outcome is already decided
    Skipped,
    /// Asking the rebuild service for a sanitized copy
    Rebuilding,
    /// Publishing the outcome notification
    Signaling,
    /// Outcome published and cache written back
    Done,
}

impl WorkflowState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this state calls an external service
    pub fn is_external_call(&self) -> bool {
        matches!(self, Self::Classifying | Self::Rebuilding)
    }

    /// Check if the workflow may move from this state to `next`
    pub fn can_transition_to(&self, next: WorkflowState) -> bool {
        use WorkflowState::*;
        matches!(
            (*self, next),
            (Hashing, CacheLookup)
                | (Hashing, Signaling)
                | (CacheLookup, CacheHit)
                | (CacheLookup, Classifying)
                | (CacheHit, Classifying)
                | (CacheHit, Skipped)
                | (CacheHit, Rebuilding)
                | (Classifying, Skipped)
                | (Classifying, Rebuilding)
                | (Skipped, Signaling)
                | (Rebuilding, Signaling)
                | (Signaling, Done)
        )
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hashing => write!(f, "hashing"),
            Self::CacheLookup => write!(f, "cache_lookup"),
            Self::CacheHit => write!(f, "cache_hit"),
            Self::Classifying => write!(f, "classifying"),
            Self::Skipped => write!(f, "skipped"),
            Self::Rebuilding => write!(f, "rebuilding"),
            Self::Signaling => write!(f, "signaling"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl std::str::FromStr for WorkflowState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hashing" => Ok(Self::Hashing),
            "cache_lookup" => Ok(Self::CacheLookup),
            "cache_hit" => Ok(Self::CacheHit),
            "classifying" => Ok(Self::Classifying),
            "skipped" => Ok(Self::Skipped),
            "rebuilding" => Ok(Self::Rebuilding),
            "signaling" => Ok(Self::Signaling),
            "done" => Ok(Self::Done),
            _ => Err(format!("Invalid workflow state: {s}")),
        }
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::Hashing
    }
}
