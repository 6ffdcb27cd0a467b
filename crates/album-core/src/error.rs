//! Error types for calls to the hosted backend.
//!
//! Both the table client and the bucket client translate HTTP failures into
//! `BackendError` so callers can tell authentication problems and transient
//! outages apart without knowing the transport.

/// Failure talking to the hosted backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => BackendError::Unauthorized(body),
            404 => BackendError::NotFound(body),
            _ => BackendError::Status { status, body },
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Request(_) | BackendError::Timeout(_) => true,
            BackendError::Status { status, .. } => *status == 429 || *status >= 500,
            BackendError::Unauthorized(_)
            | BackendError::NotFound(_)
            | BackendError::InvalidResponse(_)
            | BackendError::InvalidRequest(_) => false,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Unauthorized(_))
    }
}
