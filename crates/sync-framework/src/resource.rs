//! # SyncResource Trait
//!
//! The `SyncResource` trait names a remote collection and the shapes it returns. The
//! controller, store and decoding logic are written once against this trait and work
//! for news, sectors, team members or anything else the dashboard lists.
//!
//! ```rust
//! use serde::Deserialize;
//! use sync_framework::SyncResource;
//!
//! #[derive(Debug, Clone, Deserialize)]
//! struct Widget { id: u32, name: String }
//!
//! struct Widgets;
//!
//! impl SyncResource for Widgets {
//!     type Record = Widget;
//!     type Stats = serde::de::IgnoredAny;
//!     fn endpoint() -> &'static str { "widgets" }
//! }
//! ```

use crate::error::SyncError;
use crate::query::ServerPagination;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;

/// Trait that any remote collection must implement to be synchronized by a controller.
///
/// The resource itself carries no data; it is a type-level description. Records are
/// opaque to the framework beyond being deserializable and cloneable.
pub trait SyncResource: Send + Sync + 'static {
    /// One row of the collection.
    type Record: DeserializeOwned + Clone + Send + Sync + Debug + 'static;

    /// Optional aggregate block the server may attach. Use
    /// `serde::de::IgnoredAny` when the endpoint has none.
    type Stats: DeserializeOwned + Clone + Send + Sync + Debug + 'static;

    /// Path segment under the API base, e.g. `"news"`.
    fn endpoint() -> &'static str;

    /// Key of the record array inside the response's `data` object.
    fn data_key() -> &'static str {
        Self::endpoint()
    }
}

/// One decoded page of a resource.
pub struct ResourcePage<R: SyncResource> {
    pub records: Vec<R::Record>,
    pub stats: Option<R::Stats>,
    pub pagination: Option<ServerPagination>,
}

impl<R: SyncResource> ResourcePage<R> {
    /// Decodes the envelope's `data` object. A missing record array is an empty page.
    pub fn decode(mut data: Value) -> Result<Self, SyncError> {
        let records = match data.get_mut(R::data_key()).map(Value::take) {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => serde_json::from_value(raw)?,
        };
        let stats = match data.get_mut("stats").map(Value::take) {
            None | Some(Value::Null) => None,
            Some(raw) => Some(serde_json::from_value(raw)?),
        };
        let pagination = match data.get_mut("pagination").map(Value::take) {
            None | Some(Value::Null) => None,
            Some(raw) => Some(serde_json::from_value(raw)?),
        };
        Ok(Self {
            records,
            stats,
            pagination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    struct ItemStats {
        total: u32,
    }

    struct Items;

    impl SyncResource for Items {
        type Record = Item;
        type Stats = ItemStats;
        fn endpoint() -> &'static str {
            "admin/items"
        }
        fn data_key() -> &'static str {
            "items"
        }
    }

    #[test]
    fn test_decode_full_page() {
        let page = ResourcePage::<Items>::decode(json!({
            "items": [{ "id": 1 }, { "id": 2 }],
            "stats": { "total": 2 },
            "pagination": { "currentPage": 1, "totalPages": 1, "totalCount": 2 }
        }))
        .unwrap();
        assert_eq!(page.records, vec![Item { id: 1 }, Item { id: 2 }]);
        assert_eq!(page.stats, Some(ItemStats { total: 2 }));
        assert_eq!(page.pagination.unwrap().total_count, 2);
    }

    #[test]
    fn test_decode_missing_parts() {
        let page = ResourcePage::<Items>::decode(json!({})).unwrap();
        assert!(page.records.is_empty());
        assert!(page.stats.is_none());
        assert!(page.pagination.is_none());
    }

    #[test]
    fn test_decode_bad_records() {
        let result = ResourcePage::<Items>::decode(json!({ "items": [{ "id": "x" }] }));
        assert!(matches!(result, Err(SyncError::Decode(_))));
    }
}
