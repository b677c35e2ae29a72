use thiserror::Error;

/// Failures of a single call to an external service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivityError {
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: String,
        status: u16,
        body: String,
    },

    /// The rebuild service reported that the file cannot be rebuilt
    #[error("{service} declined the file: {body}")]
    Unprocessable { service: String, body: String },

    #[error("{service} request timed out: {message}")]
    Timeout { service: String, message: String },

    #[error("{service} connection failed: {message}")]
    Connection { service: String, message: String },

    #[error("{service} returned a malformed response: {message}")]
    MalformedResponse { service: String, message: String },

    #[error("{service} request failed: {message}")]
    Request { service: String, message: String },

    #[error("{service} is misconfigured: {message}")]
    Configuration { service: String, message: String },
}

impl ActivityError {
    pub fn status(service: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            service: service.into(),
            status,
            body: body.into(),
        }
    }

    pub fn timeout(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn connection(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn malformed_response(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn configuration(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Classify a transport-level reqwest error
    pub fn from_reqwest(service: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(service, err.to_string())
        } else if err.is_connect() {
            Self::connection(service, err.to_string())
        } else if err.is_decode() {
            Self::malformed_response(service, err.to_string())
        } else if let Some(status) = err.status() {
            Self::status(service, status.as_u16(), err.to_string())
        } else {
            Self::Request {
                service: service.to_string(),
                message: err.to_string(),
            }
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Unprocessable { .. } => Some(422),
            _ => None,
        }
    }
}

pub type ActivityResult<T> = Result<T, ActivityError>;
