//! # Abort Registry
//!
//! Tracks the in-flight request for each resource key. Issuing a new request for a key
//! cancels the previous token *before* the new one is handed out, so a superseded
//! network call stops doing work as early as the transport allows.
//!
//! Cancellation is best-effort; the store's `request_id` check is what guarantees a
//! late response never lands.

use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One in-flight fetch: its id and the token that aborts it.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    request_id: u64,
    token: CancellationToken,
}

impl PendingRequest {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Future resolving once the request is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

/// Per-controller registry of cancellation handles.
#[derive(Debug, Default)]
pub struct AbortRegistry {
    next_id: u64,
    pending: HashMap<String, PendingRequest>,
}

impl AbortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels whatever is registered under `key` and registers a fresh request.
    pub fn issue(&mut self, key: &str) -> PendingRequest {
        if let Some(previous) = self.pending.remove(key) {
            debug!(key, request_id = previous.request_id, "Cancelling superseded request");
            previous.token.cancel();
        }
        self.next_id += 1;
        let request = PendingRequest {
            request_id: self.next_id,
            token: CancellationToken::new(),
        };
        self.pending.insert(key.to_string(), request.clone());
        request
    }

    /// True if `request_id` is the one currently registered under `key`.
    pub fn is_current(&self, key: &str, request_id: u64) -> bool {
        self.pending
            .get(key)
            .is_some_and(|p| p.request_id == request_id)
    }

    /// Unregisters a finished request. A newer request under the same key is left alone.
    pub fn complete(&mut self, key: &str, request_id: u64) -> bool {
        if self.is_current(key, request_id) {
            self.pending.remove(key);
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self, key: &str) {
        if let Some(request) = self.pending.remove(key) {
            request.token.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        for (key, request) in self.pending.drain() {
            debug!(key, request_id = request.request_id, "Cancelling on teardown");
            request.token.cancel();
        }
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_cancels_previous() {
        let mut registry = AbortRegistry::new();
        let first = registry.issue("news");
        let second = registry.issue("news");

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(second.request_id() > first.request_id());
        assert!(!registry.is_current("news", first.request_id()));
        assert!(registry.is_current("news", second.request_id()));
    }

    #[test]
    fn test_keys_are_independent() {
        let mut registry = AbortRegistry::new();
        let news = registry.issue("news");
        let sectors = registry.issue("sectors");
        assert!(!news.is_cancelled());
        assert_eq!(registry.in_flight(), 2);

        registry.cancel("news");
        assert!(news.is_cancelled());
        assert!(!sectors.is_cancelled());
    }

    #[test]
    fn test_complete_ignores_stale_ids() {
        let mut registry = AbortRegistry::new();
        let old = registry.issue("news");
        let new = registry.issue("news");
        assert!(!registry.complete("news", old.request_id()));
        assert_eq!(registry.in_flight(), 1);
        assert!(registry.complete("news", new.request_id()));
        assert_eq!(registry.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_cancel_all_wakes_waiters() {
        let mut registry = AbortRegistry::new();
        let a = registry.issue("a");
        let b = registry.issue("b");
        let waiter = tokio::spawn(async move {
            a.cancelled().await;
            b.cancelled().await;
        });
        registry.cancel_all();
        waiter.await.unwrap();
        assert_eq!(registry.in_flight(), 0);
    }
}
