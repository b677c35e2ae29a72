use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal status of a processed file, as carried on the wire and in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessingOutcome {
    /// No status has been decided; never remembered as a cached result
    Unknown,
    /// The rebuild service produced a sanitized artifact
    Rebuilt,
    /// The rebuild service declined the file
    Failed,
    /// Classification or rebuild could not complete
    Error,
    /// The file type is not handled by the rebuild service
    Unmanaged,
}

impl ProcessingOutcome {
    /// Check if this outcome can be reused from the cache without fresh work
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Check if a rebuilt artifact exists for this outcome
    pub fn has_artifact(&self) -> bool {
        matches!(self, Self::Rebuilt)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Rebuilt => "Rebuilt",
            Self::Failed => "Failed",
            Self::Error => "Error",
            Self::Unmanaged => "Unmanaged",
        }
    }

    /// Outcome of a rebuild attempt
    pub fn from_rebuild(result: RebuildResult) -> Self {
        match result {
            RebuildResult::Rebuilt => Self::Rebuilt,
            RebuildResult::NotRebuildable => Self::Failed,
            RebuildResult::Error => Self::Error,
        }
    }
}

impl fmt::Display for ProcessingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProcessingOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unknown" => Ok(Self::Unknown),
            "rebuilt" => Ok(Self::Rebuilt),
            "failed" => Ok(Self::Failed),
            "error" => Ok(Self::Error),
            "unmanaged" => Ok(Self::Unmanaged),
            _ => Err(format!("Invalid processing outcome: {s}")),
        }
    }
}

impl Default for ProcessingOutcome {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Result reported by the rebuild service client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildResult {
    Rebuilt,
    /// The service answered that the file cannot be rebuilt
    NotRebuildable,
    /// Retries exhausted or a non-transient failure
    Error,
}

impl fmt::Display for RebuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rebuilt => write!(f, "rebuilt"),
            Self::NotRebuildable => write!(f, "not_rebuildable"),
            Self::Error => write!(f, "error"),
        }
    }
}
