//! # Resource State Store
//!
//! Single owner of one resource's client-visible state. Every mutation goes through the
//! store, which then publishes a fresh [`ResourceState`] on a `watch` channel for UI
//! consumers.
//!
//! Out-of-order responses are handled here: the store remembers the id of the most
//! recently issued request, and `apply_result`/`apply_error` for any other id are
//! no-ops.

use crate::query::{Filters, Pagination, PaginationUpdate, ResourceQuery, SortOrder};
use crate::resource::{ResourcePage, SyncResource};
use std::fmt;
use tokio::sync::watch;
use tracing::{debug, trace};

/// Client-visible state of one synchronized resource.
pub struct ResourceState<R: SyncResource> {
    pub data: Vec<R::Record>,
    pub stats: Option<R::Stats>,
    pub pagination: Pagination,
    pub filters: Filters,
    pub sort: SortOrder,
    pub loading: bool,
    /// A fetch for the latest request is outstanding. Unlike `loading` this is set for
    /// every fetch, including background refreshes of a populated view.
    pub fetching: bool,
    pub error: Option<String>,
    /// True once any fetch has been applied.
    pub loaded: bool,
}

impl<R: SyncResource> ResourceState<R> {
    pub fn new(limit: u32, sort: SortOrder) -> Self {
        Self {
            data: Vec::new(),
            stats: None,
            pagination: Pagination::new(limit),
            filters: Filters::new(),
            sort,
            loading: false,
            fetching: false,
            error: None,
            loaded: false,
        }
    }
}

impl<R: SyncResource> Clone for ResourceState<R> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            stats: self.stats.clone(),
            pagination: self.pagination,
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            loading: self.loading,
            fetching: self.fetching,
            error: self.error.clone(),
            loaded: self.loaded,
        }
    }
}

impl<R: SyncResource> fmt::Debug for ResourceState<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceState")
            .field("records", &self.data.len())
            .field("stats", &self.stats)
            .field("pagination", &self.pagination)
            .field("filters", &self.filters)
            .field("sort", &self.sort)
            .field("loading", &self.loading)
            .field("fetching", &self.fetching)
            .field("error", &self.error)
            .finish()
    }
}

/// Owns a [`ResourceState`] and publishes every change.
pub struct ResourceStore<R: SyncResource> {
    state: ResourceState<R>,
    latest_request: Option<u64>,
    publisher: watch::Sender<ResourceState<R>>,
}

impl<R: SyncResource> ResourceStore<R> {
    pub fn new(initial: ResourceState<R>) -> Self {
        let (publisher, _) = watch::channel(initial.clone());
        Self {
            state: initial,
            latest_request: None,
            publisher,
        }
    }

    pub fn state(&self) -> &ResourceState<R> {
        &self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState<R>> {
        self.publisher.subscribe()
    }

    pub fn latest_request(&self) -> Option<u64> {
        self.latest_request
    }

    /// Merges `partial` into the filters and goes back to page 1.
    pub fn update_filters(&mut self, partial: Filters) {
        self.state.filters.merge(partial);
        self.state.pagination.current_page = 1;
        self.publish();
    }

    /// Merges a pagination change. Filters are untouched.
    pub fn update_pagination(&mut self, update: PaginationUpdate) {
        self.state.pagination.merge(update);
        self.publish();
    }

    /// Changes the ordering and goes back to page 1.
    pub fn update_sort(&mut self, sort: SortOrder) {
        self.state.sort = sort;
        self.state.pagination.current_page = 1;
        self.publish();
    }

    /// Snapshot of the current state as a query.
    pub fn query(&self) -> ResourceQuery {
        ResourceQuery::new(
            R::endpoint(),
            self.state.pagination.current_page,
            self.state.pagination.limit,
            self.state.sort.clone(),
        )
        .with_filters(self.state.filters.clone())
    }

    /// Records `request_id` as the most recent request and clears the previous error.
    ///
    /// `loading` only turns on for the first load or when forced, so refreshing a
    /// populated view does not flicker.
    pub fn begin_request(&mut self, request_id: u64, force_loading: bool) {
        self.latest_request = Some(request_id);
        self.state.error = None;
        self.state.fetching = true;
        if force_loading || !self.state.loaded {
            self.state.loading = true;
        }
        self.publish();
    }

    pub fn is_latest(&self, request_id: u64) -> bool {
        self.latest_request == Some(request_id)
    }

    /// Applies a page if `request_id` is still the latest. Returns whether it did.
    pub fn apply_result(&mut self, request_id: u64, page: ResourcePage<R>) -> bool {
        if !self.is_latest(request_id) {
            debug!(request_id, latest = ?self.latest_request, "Discarding stale result");
            return false;
        }
        self.state.data = page.records;
        if let Some(stats) = page.stats {
            self.state.stats = Some(stats);
        }
        if let Some(pagination) = page.pagination {
            self.state.pagination.absorb(pagination);
        }
        self.state.loading = false;
        self.state.fetching = false;
        self.state.loaded = true;
        self.publish();
        true
    }

    /// Records a failure if `request_id` is still the latest. Data is kept.
    pub fn apply_error(&mut self, request_id: u64, message: impl Into<String>) -> bool {
        if !self.is_latest(request_id) {
            debug!(request_id, latest = ?self.latest_request, "Discarding stale error");
            return false;
        }
        self.state.error = Some(message.into());
        self.state.loading = false;
        self.state.fetching = false;
        self.publish();
        true
    }

    fn publish(&self) {
        trace!(endpoint = R::endpoint(), state = ?self.state, "Publishing state");
        self.publisher.send_replace(self.state.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FilterValue, ServerPagination, SortDirection};
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Widget {
        id: u32,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct WidgetStats {
        active: u32,
    }

    struct Widgets;

    impl SyncResource for Widgets {
        type Record = Widget;
        type Stats = WidgetStats;
        fn endpoint() -> &'static str {
            "widgets"
        }
    }

    fn store() -> ResourceStore<Widgets> {
        ResourceStore::new(ResourceState::new(
            20,
            SortOrder {
                order_by: "created_at".into(),
                direction: SortDirection::Desc,
            },
        ))
    }

    fn page(ids: &[u32]) -> ResourcePage<Widgets> {
        ResourcePage {
            records: ids.iter().map(|&id| Widget { id }).collect(),
            stats: None,
            pagination: None,
        }
    }

    fn ids(store: &ResourceStore<Widgets>) -> Vec<u32> {
        store.state().data.iter().map(|w| w.id).collect()
    }

    #[test]
    fn test_filter_update_resets_page() {
        let mut store = store();
        for page in [1, 4, 9] {
            store.update_pagination(PaginationUpdate::page(page));
            assert_eq!(store.state().pagination.current_page, page);
            store.update_filters(Filters::new().with("status", format!("s{page}")));
            assert_eq!(store.state().pagination.current_page, 1);
        }
    }

    #[test]
    fn test_pagination_update_keeps_filters() {
        let mut store = store();
        store.update_filters(Filters::new().with("status", "active"));
        store.update_pagination(PaginationUpdate::page(3));
        assert_eq!(store.state().pagination.current_page, 3);
        assert_eq!(
            store.state().filters,
            Filters::new().with("status", "active")
        );
    }

    #[test]
    fn test_stale_results_are_discarded_in_every_order() {
        // A issued, then B; both resolution orders must end on B.
        for b_first in [false, true] {
            let mut store = store();
            store.begin_request(1, false);
            store.begin_request(2, false);

            if b_first {
                assert!(store.apply_result(2, page(&[20])));
                assert!(!store.apply_result(1, page(&[10])));
            } else {
                assert!(!store.apply_result(1, page(&[10])));
                assert!(store.apply_result(2, page(&[20])));
            }
            assert_eq!(ids(&store), vec![20]);
            assert!(!store.state().loading);
        }
    }

    #[test]
    fn test_stale_error_is_discarded() {
        let mut store = store();
        store.begin_request(1, false);
        store.begin_request(2, false);
        assert!(!store.apply_error(1, "late failure"));
        assert!(store.state().error.is_none());
        assert!(store.state().loading);
    }

    #[test]
    fn test_loading_only_for_first_load_or_forced() {
        let mut store = store();
        store.begin_request(1, false);
        assert!(store.state().loading);
        store.apply_result(1, page(&[1]));

        store.begin_request(2, false);
        assert!(!store.state().loading);
        assert!(store.state().fetching);
        store.apply_result(2, page(&[1]));
        assert!(!store.state().fetching);

        store.begin_request(3, true);
        assert!(store.state().loading);
    }

    #[test]
    fn test_error_keeps_last_good_data() {
        let mut store = store();
        store.begin_request(1, false);
        store.apply_result(1, page(&[1, 2]));
        store.begin_request(2, true);
        store.apply_error(2, "Network error: reset");

        assert_eq!(ids(&store), vec![1, 2]);
        assert_eq!(store.state().error.as_deref(), Some("Network error: reset"));
        assert!(!store.state().loading);

        store.begin_request(3, false);
        assert!(store.state().error.is_none());
    }

    #[test]
    fn test_server_pagination_keeps_local_limit() {
        let mut store = store();
        store.update_pagination(PaginationUpdate::limit(50));
        store.begin_request(1, false);
        let mut result = page(&[1]);
        result.stats = Some(WidgetStats { active: 1 });
        result.pagination = Some(ServerPagination {
            current_page: 2,
            total_pages: 5,
            total_count: 230,
        });
        store.apply_result(1, result);

        let pagination = store.state().pagination;
        assert_eq!(pagination.limit, 50);
        assert_eq!(pagination.current_page, 2);
        assert_eq!(pagination.total_count, 230);
        assert_eq!(store.state().stats, Some(WidgetStats { active: 1 }));
    }

    #[test]
    fn test_subscribers_see_changes() {
        let mut store = store();
        let mut receiver = store.subscribe();
        store.update_filters(Filters::new().with("search", "gear"));
        assert!(receiver.has_changed().unwrap());
        assert_eq!(
            receiver.borrow_and_update().filters.get("search"),
            Some(&FilterValue::from("gear"))
        );
    }

    #[test]
    fn test_query_reflects_state() {
        let mut store = store();
        store.update_filters(Filters::new().with("status", "archived"));
        let query = store.query();
        assert_eq!(query.endpoint, "widgets");
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 20);
        assert_eq!(query.param("status").as_deref(), Some("archived"));
    }
}
