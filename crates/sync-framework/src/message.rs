//! # Controller Messages
//!
//! Commands a [`SyncHandle`](crate::handle::SyncHandle) sends to its controller, and the
//! completion message fetch tasks send back. Each command carries an acknowledgement
//! channel so callers can await the state transition, not the network.

use crate::error::SyncError;
use crate::query::{Filters, PaginationUpdate, SortOrder};
use crate::resource::{ResourcePage, SyncResource};
use tokio::sync::oneshot;

/// Acknowledgement sent once the controller has applied a command.
pub type Ack = oneshot::Sender<()>;

/// How a filter change reaches the fetch path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Debounced unless every changed key is configured as immediate.
    Auto,
    /// Always fetch immediately.
    Immediate,
}

/// State changes a controller applies, each followed by its fetch trigger.
#[derive(Debug)]
pub enum SyncCommand {
    UpdateFilters { partial: Filters, mode: FilterMode },
    UpdatePagination(PaginationUpdate),
    UpdateSort(SortOrder),
    Fetch { force_loading: bool },
}

/// Messages accepted by a controller.
#[derive(Debug)]
pub enum SyncRequest {
    Command { command: SyncCommand, respond_to: Ack },
    /// Stops the controller; acknowledged once teardown is done.
    Dispose { respond_to: Ack },
}

/// Sent by a fetch task when its request reaches a terminal outcome.
pub(crate) struct FetchFinished<R: SyncResource> {
    pub request_id: u64,
    pub outcome: Result<ResourcePage<R>, SyncError>,
}
