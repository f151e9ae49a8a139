//! # Lookup Directory
//!
//! Reference collections (locations, positions, users) feed select inputs across many
//! forms and change rarely. The directory keeps one copy of each in a shared
//! [`TtlCache`] so that opening a form does not hit the network every time.
//!
//! Loads go through the same [`RetryExecutor`] the views use. A failed load is not
//! cached; the next `get` tries again.

use crate::error::LookupError;
use crate::model::{LookupItem, LookupKind};
use serde_json::Value;
use std::sync::Arc;
use sync_framework::{
    ResourceQuery, ResourceTransport, RetryExecutor, SortDirection, SortOrder, SyncError, TtlCache,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Reference collections are requested in one large page.
const LOOKUP_PAGE_LIMIT: u32 = 1000;

#[derive(Clone)]
pub struct LookupDirectory {
    cache: Arc<TtlCache<Vec<LookupItem>>>,
    transport: Arc<dyn ResourceTransport>,
    executor: RetryExecutor,
}

impl LookupDirectory {
    pub fn new(
        cache: Arc<TtlCache<Vec<LookupItem>>>,
        transport: Arc<dyn ResourceTransport>,
        executor: RetryExecutor,
    ) -> Self {
        Self {
            cache,
            transport,
            executor,
        }
    }

    pub fn cache(&self) -> &Arc<TtlCache<Vec<LookupItem>>> {
        &self.cache
    }

    /// Cached collection if still fresh, otherwise loads and caches it.
    #[instrument(skip(self))]
    pub async fn get(&self, kind: LookupKind) -> Result<Vec<LookupItem>, LookupError> {
        self.cache
            .get_or_fetch(kind.endpoint(), || self.load(kind))
            .await
    }

    /// Reloads regardless of freshness, e.g. after the user created a new location.
    #[instrument(skip(self))]
    pub async fn refresh(&self, kind: LookupKind) -> Result<Vec<LookupItem>, LookupError> {
        self.cache.refresh(kind.endpoint(), || self.load(kind)).await
    }

    /// Resolves one entry by id.
    pub async fn find(&self, kind: LookupKind, id: u64) -> Result<LookupItem, LookupError> {
        self.get(kind)
            .await?
            .into_iter()
            .find(|item| item.id == id)
            .ok_or(LookupError::NotFound { kind, id })
    }

    /// Loads every collection that is not already cached.
    pub async fn warm(&self) -> Result<(), LookupError> {
        for kind in LookupKind::ALL {
            self.get(kind).await?;
        }
        Ok(())
    }

    async fn load(&self, kind: LookupKind) -> Result<Vec<LookupItem>, LookupError> {
        let query = ResourceQuery::new(
            kind.endpoint(),
            1,
            LOOKUP_PAGE_LIMIT,
            SortOrder {
                order_by: "name".to_string(),
                direction: SortDirection::Asc,
            },
        );
        // Lookups are never superseded, so the token is never cancelled.
        let token = CancellationToken::new();
        let data = self
            .executor
            .execute(&token, |_| {
                let transport = self.transport.clone();
                let query = query.clone();
                async move { transport.fetch(query).await }
            })
            .await
            .map_err(|source| LookupError::Fetch { kind, source })?;

        let items = decode_items(kind, data).map_err(|source| LookupError::Fetch { kind, source })?;
        info!(%kind, count = items.len(), "Loaded lookup");
        Ok(items)
    }
}

fn decode_items(kind: LookupKind, mut data: Value) -> Result<Vec<LookupItem>, SyncError> {
    match data.get_mut(kind.endpoint()).map(Value::take) {
        None | Some(Value::Null) => {
            debug!(%kind, "Response carried no records");
            Ok(Vec::new())
        }
        Some(raw) => Ok(serde_json::from_value(raw)?),
    }
}
