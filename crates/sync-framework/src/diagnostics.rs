//! # Diagnostics
//!
//! Controllers and caches report what they do through an injected [`SyncDiagnostics`]
//! sink instead of any process-wide tracking state. Production wiring usually passes
//! [`NoopDiagnostics`]; tests and debug screens pass a shared [`SyncCounters`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Observable events emitted by the synchronization machinery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    FetchStarted { endpoint: String, request_id: u64 },
    FetchDropped { endpoint: String },
    FetchSuperseded { endpoint: String, request_id: u64 },
    StaleDiscarded { endpoint: String, request_id: u64 },
    RetryScheduled { attempt: u32, delay_ms: u64 },
    Applied { endpoint: String, request_id: u64 },
    Failed { endpoint: String, request_id: u64 },
    CacheHit { key: String },
    CacheMiss { key: String },
}

/// Sink for [`SyncEvent`]s.
pub trait SyncDiagnostics: Send + Sync {
    fn record(&self, event: SyncEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl SyncDiagnostics for NoopDiagnostics {
    fn record(&self, _event: SyncEvent) {}
}

/// Lock-free counters, one per event kind.
#[derive(Debug, Default)]
pub struct SyncCounters {
    fetches_started: AtomicU64,
    fetches_dropped: AtomicU64,
    fetches_superseded: AtomicU64,
    stale_discarded: AtomicU64,
    retries: AtomicU64,
    applied: AtomicU64,
    failed: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl SyncCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetches_started(&self) -> u64 {
        self.fetches_started.load(Ordering::Relaxed)
    }

    pub fn fetches_dropped(&self) -> u64 {
        self.fetches_dropped.load(Ordering::Relaxed)
    }

    pub fn fetches_superseded(&self) -> u64 {
        self.fetches_superseded.load(Ordering::Relaxed)
    }

    pub fn stale_discarded(&self) -> u64 {
        self.stale_discarded.load(Ordering::Relaxed)
    }

    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }
}

impl SyncDiagnostics for SyncCounters {
    fn record(&self, event: SyncEvent) {
        let counter = match event {
            SyncEvent::FetchStarted { .. } => &self.fetches_started,
            SyncEvent::FetchDropped { .. } => &self.fetches_dropped,
            SyncEvent::FetchSuperseded { .. } => &self.fetches_superseded,
            SyncEvent::StaleDiscarded { .. } => &self.stale_discarded,
            SyncEvent::RetryScheduled { .. } => &self.retries,
            SyncEvent::Applied { .. } => &self.applied,
            SyncEvent::Failed { .. } => &self.failed,
            SyncEvent::CacheHit { .. } => &self.cache_hits,
            SyncEvent::CacheMiss { .. } => &self.cache_misses,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
