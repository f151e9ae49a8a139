//! # Sector Client
//!
//! High-level API for the sector list view.
use crate::clients::view_client::ViewClient;
use crate::error::SectorError;
use crate::model::{Sector, SectorStats, Sectors};
use async_trait::async_trait;
use sync_framework::{Filters, SyncError, SyncHandle};
use tracing::{debug, instrument};

/// Client for the sector view.
#[derive(Clone)]
pub struct SectorClient {
    handle: SyncHandle<Sectors>,
}

impl SectorClient {
    pub fn new(handle: SyncHandle<Sectors>) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ViewClient<Sectors> for SectorClient {
    type Error = SectorError;

    fn handle(&self) -> &SyncHandle<Sectors> {
        &self.handle
    }

    fn map_error(e: SyncError) -> Self::Error {
        SectorError::ControllerCommunicationError(e.to_string())
    }
}

impl SectorClient {
    #[instrument(skip(self))]
    pub async fn search(&self, text: &str) -> Result<(), SectorError> {
        debug!("Sending request");
        self.handle
            .update_filters(Filters::new().with("search", text.trim()))
            .await
            .map_err(Self::map_error)
    }

    /// `Some(true)` lists only active sectors, `None` lists all.
    #[instrument(skip(self))]
    pub async fn filter_by_active(&self, active: Option<bool>) -> Result<(), SectorError> {
        debug!("Sending request");
        self.handle
            .update_filters_now(Filters::new().with("active", active))
            .await
            .map_err(Self::map_error)
    }

    pub fn sectors(&self) -> Vec<Sector> {
        self.handle.data()
    }

    pub fn stats(&self) -> Option<SectorStats> {
        self.handle.stats()
    }

    /// Looks a sector up in the currently loaded page.
    pub fn find(&self, id: u64) -> Option<Sector> {
        self.handle.data().into_iter().find(|sector| sector.id == id)
    }
}
