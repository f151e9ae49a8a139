//! # Sync Handle
//!
//! The object UI collaborators hold. It sends commands to a
//! [`SyncController`](crate::controller::SyncController) and reads the published
//! [`ResourceState`]. Cheap to clone; every clone drives the same controller.

use crate::error::SyncError;
use crate::message::{FilterMode, SyncCommand, SyncRequest};
use crate::query::{Filters, Pagination, PaginationUpdate, SortDirection, SortOrder};
use crate::resource::SyncResource;
use crate::store::ResourceState;
use tokio::sync::{mpsc, oneshot, watch};

/// Handle to a running controller.
///
/// Command methods resolve once the controller has applied the state change; they do
/// not wait for the network. Fetch failures are reported through
/// [`ResourceState::error`], never as `Err`. The only errors these methods return are
/// about the controller itself being gone.
pub struct SyncHandle<R: SyncResource> {
    sender: mpsc::Sender<SyncRequest>,
    state: watch::Receiver<ResourceState<R>>,
}

impl<R: SyncResource> Clone for SyncHandle<R> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            state: self.state.clone(),
        }
    }
}

impl<R: SyncResource> SyncHandle<R> {
    pub(crate) fn new(
        sender: mpsc::Sender<SyncRequest>,
        state: watch::Receiver<ResourceState<R>>,
    ) -> Self {
        Self { sender, state }
    }

    async fn send(&self, build: impl FnOnce(oneshot::Sender<()>) -> SyncRequest) -> Result<(), SyncError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| SyncError::ControllerClosed)?;
        response.await.map_err(|_| SyncError::ControllerDropped)
    }

    async fn command(&self, command: SyncCommand) -> Result<(), SyncError> {
        self.send(|respond_to| SyncRequest::Command {
            command,
            respond_to,
        })
        .await
    }

    /// Merges `partial` into the filters and resets to page 1. The fetch is debounced
    /// unless every changed key is configured as immediate.
    pub async fn update_filters(&self, partial: Filters) -> Result<(), SyncError> {
        self.command(SyncCommand::UpdateFilters {
            partial,
            mode: FilterMode::Auto,
        })
        .await
    }

    /// Like [`update_filters`](Self::update_filters) but always fetches immediately.
    pub async fn update_filters_now(&self, partial: Filters) -> Result<(), SyncError> {
        self.command(SyncCommand::UpdateFilters {
            partial,
            mode: FilterMode::Immediate,
        })
        .await
    }

    /// Merges a pagination change and fetches immediately.
    pub async fn update_pagination(&self, update: PaginationUpdate) -> Result<(), SyncError> {
        self.command(SyncCommand::UpdatePagination(update)).await
    }

    /// Changes the ordering, resets to page 1 and fetches immediately.
    pub async fn update_sort(
        &self,
        order_by: impl Into<String>,
        direction: SortDirection,
    ) -> Result<(), SyncError> {
        let sort = SortOrder {
            order_by: order_by.into(),
            direction,
        };
        self.command(SyncCommand::UpdateSort(sort)).await
    }

    pub async fn fetch(&self, force_loading: bool) -> Result<(), SyncError> {
        self.command(SyncCommand::Fetch { force_loading }).await
    }

    /// Same as `fetch(true)`.
    pub async fn reload(&self) -> Result<(), SyncError> {
        self.fetch(true).await
    }

    /// Stops the controller: disarms the debounce timer and cancels in-flight requests.
    /// Disposing an already stopped controller is a no-op.
    pub async fn dispose(&self) {
        let _ = self
            .send(|respond_to| SyncRequest::Dispose { respond_to })
            .await;
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ResourceState<R> {
        self.state.borrow().clone()
    }

    /// A receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<R>> {
        self.state.clone()
    }

    /// Waits until the state satisfies `predicate` and returns that state.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&ResourceState<R>) -> bool,
    ) -> Result<ResourceState<R>, SyncError> {
        let mut receiver = self.state.clone();
        let state = receiver
            .wait_for(predicate)
            .await
            .map_err(|_| SyncError::ControllerClosed)?;
        Ok(state.clone())
    }

    pub fn data(&self) -> Vec<R::Record> {
        self.state.borrow().data.clone()
    }

    pub fn stats(&self) -> Option<R::Stats> {
        self.state.borrow().stats.clone()
    }

    pub fn pagination(&self) -> Pagination {
        self.state.borrow().pagination
    }

    pub fn filters(&self) -> Filters {
        self.state.borrow().filters.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn fetching(&self) -> bool {
        self.state.borrow().fetching
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }
}
