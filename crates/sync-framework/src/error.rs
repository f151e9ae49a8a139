//! # Framework Errors
//!
//! This module defines the common error types used throughout the synchronization
//! framework. Fetch failures never cross the controller's public API as `Err`; they are
//! recorded into the resource state. `SyncError` is what transports, the retry executor
//! and the handle's own channel plumbing report.

/// Errors that can occur while synchronizing a remote resource.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SyncError {
    #[error("Controller closed")]
    ControllerClosed,
    #[error("Controller dropped response channel")]
    ControllerDropped,
    #[error("No authenticated session")]
    Unauthenticated,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out after {0}ms")]
    Timeout(u64),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Server error: {0}")]
    Server(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Request cancelled")]
    Cancelled,
}

impl SyncError {
    /// Fatal errors end the current fetch immediately, whatever the retry policy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Unauthenticated | SyncError::Cancelled)
    }

    /// Network-class failures: connection problems, timeouts and 5xx responses.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Network(_) | SyncError::Timeout(_) => true,
            SyncError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(SyncError::Unauthenticated.is_fatal());
        assert!(!SyncError::Unauthenticated.is_transient());
        assert!(SyncError::Timeout(10).is_transient());
        assert!(SyncError::Network("reset".into()).is_transient());
        assert!(SyncError::Http {
            status: 503,
            message: "unavailable".into()
        }
        .is_transient());
        assert!(!SyncError::Http {
            status: 404,
            message: "missing".into()
        }
        .is_transient());
        assert!(!SyncError::Server("bad filter".into()).is_transient());
    }
}
