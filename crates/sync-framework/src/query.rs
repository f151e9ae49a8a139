//! # Queries, Filters and Pagination
//!
//! A [`ResourceQuery`] is the immutable description of one request. The controller
//! builds a fresh one for every fetch from its current state, so nothing read during
//! the network call can change underneath it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Placeholder value meaning "no filter" for select-style inputs.
pub const ALL_SENTINEL: &str = "all";

/// A single filter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FilterValue {
    /// Empty text, the `"all"` sentinel and null mean "unfiltered".
    pub fn is_placeholder(&self) -> bool {
        match self {
            FilterValue::Null => true,
            FilterValue::Text(s) => s.trim().is_empty() || s == ALL_SENTINEL,
            _ => false,
        }
    }
}

impl Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Null => Ok(()),
            FilterValue::Bool(b) => write!(f, "{b}"),
            FilterValue::Int(n) => write!(f, "{n}"),
            FilterValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Int(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FilterValue::Null, Into::into)
    }
}

/// Filter name → value. Ordered so serialized queries are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters(BTreeMap<String, FilterValue>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrites the keys present in `partial`, keeps the rest.
    pub fn merge(&mut self, partial: Filters) {
        self.0.extend(partial.0);
    }

    /// Entries that survive placeholder omission.
    pub fn active(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.0
            .iter()
            .filter(|(_, v)| !v.is_placeholder())
            .map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub order_by: String,
    pub direction: SortDirection,
}

/// Client-side pagination state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub limit: u32,
}

impl Pagination {
    pub fn new(limit: u32) -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            total_count: 0,
            limit: limit.max(1),
        }
    }

    /// Merge a partial update. Page and limit are clamped to at least 1.
    pub fn merge(&mut self, update: PaginationUpdate) {
        if let Some(page) = update.current_page {
            self.current_page = page.max(1);
        }
        if let Some(limit) = update.limit {
            self.limit = limit.max(1);
        }
    }

    /// Take the server's totals and page, keep the locally held `limit`.
    pub fn absorb(&mut self, server: ServerPagination) {
        self.current_page = server.current_page.max(1);
        self.total_pages = server.total_pages;
        self.total_count = server.total_count;
    }
}

/// Partial pagination change from the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationUpdate {
    pub current_page: Option<u32>,
    pub limit: Option<u32>,
}

impl PaginationUpdate {
    pub fn page(page: u32) -> Self {
        Self {
            current_page: Some(page),
            limit: None,
        }
    }

    pub fn limit(limit: u32) -> Self {
        Self {
            current_page: None,
            limit: Some(limit),
        }
    }
}

/// Pagination block as the server reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerPagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

/// Immutable description of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceQuery {
    pub endpoint: String,
    pub page: u32,
    pub limit: u32,
    pub sort: SortOrder,
    pub filters: Filters,
}

impl ResourceQuery {
    pub fn new(endpoint: impl Into<String>, page: u32, limit: u32, sort: SortOrder) -> Self {
        Self {
            endpoint: endpoint.into(),
            page: page.max(1),
            limit: limit.max(1),
            sort,
            filters: Filters::new(),
        }
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Query-string pairs: paging and ordering first, then one pair per active filter.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
            ("order_by".to_string(), self.sort.order_by.clone()),
            ("order_direction".to_string(), self.sort.direction.to_string()),
        ];
        pairs.extend(
            self.filters
                .active()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        pairs
    }

    /// Value of a query parameter as it would be sent.
    pub fn param(&self, name: &str) -> Option<String> {
        self.to_query_pairs()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}
