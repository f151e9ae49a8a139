//! # ViewClient Trait
//!
//! Common interface for view-specific clients, adding default paging, reload and
//! read methods on top of a [`SyncHandle`].
use async_trait::async_trait;
use sync_framework::{PaginationUpdate, ResourceState, SyncError, SyncHandle, SyncResource};

/// Trait for view clients to inherit the operations every synchronized view has.
#[async_trait]
pub trait ViewClient<R: SyncResource>: Send + Sync {
    /// The view-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the underlying handle.
    fn handle(&self) -> &SyncHandle<R>;

    /// Map framework errors to the view's error type.
    fn map_error(e: SyncError) -> Self::Error;

    /// Jump to `page`. Filters are kept.
    #[tracing::instrument(skip(self))]
    async fn go_to_page(&self, page: u32) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.handle()
            .update_pagination(PaginationUpdate::page(page))
            .await
            .map_err(Self::map_error)
    }

    #[tracing::instrument(skip(self))]
    async fn set_page_size(&self, limit: u32) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.handle()
            .update_pagination(PaginationUpdate::limit(limit))
            .await
            .map_err(Self::map_error)
    }

    /// Refetch the current page with the loading indicator on.
    #[tracing::instrument(skip(self))]
    async fn reload(&self) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.handle().reload().await.map_err(Self::map_error)
    }

    /// Waits until no fetch is outstanding and one has either landed or failed.
    ///
    /// A debounced change has not started its fetch yet, so this can resolve before it.
    async fn settled(&self) -> Result<ResourceState<R>, Self::Error> {
        self.handle()
            .wait_for(|s| !s.fetching && (s.loaded || s.error.is_some()))
            .await
            .map_err(Self::map_error)
    }

    fn snapshot(&self) -> ResourceState<R> {
        self.handle().snapshot()
    }

    async fn dispose(&self) {
        self.handle().dispose().await
    }
}
