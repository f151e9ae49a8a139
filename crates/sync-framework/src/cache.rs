//! # TTL Cache
//!
//! Memoizes slow-changing reference collections (locations, positions, the user
//! directory) by name. An entry is served while `now - fetched_at < ttl`; after that it
//! is treated as absent until the next `set` replaces it. There is no background
//! eviction.
//!
//! The cache is shared between controllers of one data provider, so it sits behind a
//! lock. The lock is never held across an `.await`: two concurrent misses for the same
//! key both fetch, and whichever `set` lands last wins.

use crate::config::CacheConfig;
use crate::diagnostics::{NoopDiagnostics, SyncDiagnostics, SyncEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// A cached value and when it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: Instant,
}

impl<V> CacheEntry<V> {
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

/// Keyed cache with a single fixed time-to-live.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    diagnostics: Arc<dyn SyncDiagnostics>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            diagnostics: Arc::new(NoopDiagnostics),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl())
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn SyncDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value, if it is still fresh.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let hit = self
            .entries
            .lock()
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl, now))
            .map(|entry| entry.value.clone());
        let event = match hit {
            Some(_) => SyncEvent::CacheHit { key: key.to_string() },
            None => SyncEvent::CacheMiss { key: key.to_string() },
        };
        self.diagnostics.record(event);
        hit
    }

    /// Stores `value` stamped with the current time, replacing any previous entry.
    pub fn set(&self, key: &str, value: V) {
        let entry = CacheEntry {
            value,
            fetched_at: Instant::now(),
        };
        self.entries.lock().insert(key.to_string(), entry);
    }

    /// `get`, falling back to `fetch` + `set` on a miss. Failed fetches are not cached.
    pub async fn get_or_fetch<E, F, Fut>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        debug!(key, "Cache miss, fetching");
        let value = fetch().await?;
        self.set(key, value.clone());
        Ok(value)
    }

    /// Forced refresh: skips `get` and always fetches.
    pub async fn refresh<E, F, Fut>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        debug!(key, "Forced cache refresh");
        let value = fetch().await?;
        self.set(key, value.clone());
        Ok(value)
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
