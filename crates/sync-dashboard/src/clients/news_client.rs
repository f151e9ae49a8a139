//! # News Client
//!
//! High-level API for the news list view. It wraps a `SyncHandle<News>` and turns UI
//! gestures (typing in the search box, picking a category) into filter updates.
use crate::clients::view_client::ViewClient;
use crate::error::NewsError;
use crate::model::{News, NewsCategory, NewsItem, NewsStats, PublishStatus};
use async_trait::async_trait;
use sync_framework::{FilterValue, Filters, SortDirection, SyncError, SyncHandle};
use tracing::{debug, instrument};

const MAX_SEARCH_LEN: usize = 200;

/// Filter keys the news view writes.
const FILTER_KEYS: [&str; 4] = ["search", "category", "status", "sector_id"];

/// Client for the news view.
#[derive(Clone)]
pub struct NewsClient {
    handle: SyncHandle<News>,
}

impl NewsClient {
    pub fn new(handle: SyncHandle<News>) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ViewClient<News> for NewsClient {
    type Error = NewsError;

    fn handle(&self) -> &SyncHandle<News> {
        &self.handle
    }

    fn map_error(e: SyncError) -> Self::Error {
        NewsError::ControllerCommunicationError(e.to_string())
    }
}

impl NewsClient {
    /// Free-text search. Debounced: keystrokes in quick succession produce one fetch.
    #[instrument(skip(self))]
    pub async fn search(&self, text: &str) -> Result<(), NewsError> {
        let text = text.trim();
        if text.chars().count() > MAX_SEARCH_LEN {
            return Err(NewsError::InvalidFilter(format!(
                "search longer than {MAX_SEARCH_LEN} characters"
            )));
        }
        debug!("Sending request");
        self.handle
            .update_filters(Filters::new().with("search", text))
            .await
            .map_err(Self::map_error)
    }

    /// `None` shows every category.
    #[instrument(skip(self))]
    pub async fn filter_by_category(&self, category: Option<NewsCategory>) -> Result<(), NewsError> {
        debug!("Sending request");
        self.handle
            .update_filters(Filters::new().with("category", category.map(|c| c.as_str())))
            .await
            .map_err(Self::map_error)
    }

    /// Select filters fetch right away; only free text is debounced.
    #[instrument(skip(self))]
    pub async fn filter_by_status(&self, status: Option<PublishStatus>) -> Result<(), NewsError> {
        debug!("Sending request");
        self.handle
            .update_filters_now(Filters::new().with("status", status.map(|s| s.as_str())))
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn filter_by_sector(&self, sector_id: Option<u64>) -> Result<(), NewsError> {
        debug!("Sending request");
        self.handle
            .update_filters_now(Filters::new().with("sector_id", sector_id.map(|id| id.to_string())))
            .await
            .map_err(Self::map_error)
    }

    /// Drops every filter and fetches right away.
    #[instrument(skip(self))]
    pub async fn clear_filters(&self) -> Result<(), NewsError> {
        debug!("Sending request");
        let cleared: Filters = FILTER_KEYS
            .iter()
            .map(|key| (*key, FilterValue::Null))
            .collect();
        self.handle
            .update_filters_now(cleared)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn sort_by(&self, field: &str, direction: SortDirection) -> Result<(), NewsError> {
        debug!("Sending request");
        self.handle
            .update_sort(field, direction)
            .await
            .map_err(Self::map_error)
    }

    pub fn items(&self) -> Vec<NewsItem> {
        self.handle.data()
    }

    pub fn stats(&self) -> Option<NewsStats> {
        self.handle.stats()
    }
}
