use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access granted by a locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocatorPermissions {
    pub read: bool,
    pub write: bool,
}

impl LocatorPermissions {
    pub const READ: Self = Self {
        read: true,
        write: false,
    };
    pub const WRITE: Self = Self {
        read: false,
        write: true,
    };
    pub const READ_WRITE: Self = Self {
        read: true,
        write: true,
    };
}

impl fmt::Display for LocatorPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.read {
            f.write_str("r")?;
        }
        if self.write {
            f.write_str("w")?;
        }
        Ok(())
    }
}

/// Issues time-limited access locators for stored blobs
///
/// Issuing must be deterministic for a given input: the workflow calls it again on
/// every replay and expects the same locator each time.
pub trait LocatorIssuer: Send + Sync {
    fn issue(
        &self,
        container: &str,
        blob_name: &str,
        expires_at: DateTime<Utc>,
        permissions: LocatorPermissions,
    ) -> String;
}

/// Builds locators as `{endpoint}/{container}/{blob}?sp={perms}&se={expiry}`
#[derive(Debug, Clone)]
pub struct TemplateLocatorIssuer {
    endpoint: String,
}

impl TemplateLocatorIssuer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

impl LocatorIssuer for TemplateLocatorIssuer {
    fn issue(
        &self,
        container: &str,
        blob_name: &str,
        expires_at: DateTime<Utc>,
        permissions: LocatorPermissions,
    ) -> String {
        format!(
            "{}/{}/{}?sp={}&se={}",
            self.endpoint,
            container,
            blob_name,
            permissions,
            expires_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}
