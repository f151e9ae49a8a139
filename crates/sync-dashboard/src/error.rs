//! Error types for the dashboard views.

use crate::model::LookupKind;
use sync_framework::SyncError;
use thiserror::Error;

/// Errors surfaced by the news view client.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NewsError {
    #[error("Invalid news filter: {0}")]
    InvalidFilter(String),

    /// The news controller is gone (disposed or crashed).
    #[error("Controller communication error: {0}")]
    ControllerCommunicationError(String),
}

impl From<String> for NewsError {
    fn from(msg: String) -> Self {
        NewsError::ControllerCommunicationError(msg)
    }
}

/// Errors surfaced by the sector view client.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SectorError {
    #[error("Controller communication error: {0}")]
    ControllerCommunicationError(String),
}

impl From<String> for SectorError {
    fn from(msg: String) -> Self {
        SectorError::ControllerCommunicationError(msg)
    }
}

/// Errors from the lookup directory.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LookupError {
    #[error("Failed to load {kind}: {source}")]
    Fetch {
        kind: LookupKind,
        #[source]
        source: SyncError,
    },

    #[error("No {kind} entry with id {id}")]
    NotFound { kind: LookupKind, id: u64 },
}
