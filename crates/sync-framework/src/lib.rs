//! # Sync Framework
//!
//! Building blocks for keeping client-held state consistent with a remote, paginated,
//! filterable resource. One [`SyncController`] per listed resource owns that resource's
//! state and answers to a cloneable [`SyncHandle`].
//!
//! ## What the controller guarantees
//!
//! - **Last request wins.** Every fetch gets a monotonically increasing request id; only
//!   the outcome of the most recent one is ever applied. Superseded requests are also
//!   cancelled through their token so they stop early.
//! - **One fetch at a time.** A concurrency guard drops fetch triggers that arrive while
//!   a fetch is in flight (or supersedes it, see [`OverlapPolicy`]).
//! - **Quiet typing.** Filter edits are debounced; pagination, sort and configured
//!   immediate filters fetch right away.
//! - **Resilient reads.** Each fetch retries with capped exponential backoff and a
//!   per-attempt timeout. A missing session is never retried.
//! - **Stale-while-revalidate.** Failures set `error` and keep the last good `data`.
//!
//! Reference data that rarely changes goes through the shared [`TtlCache`] instead.
//!
//! ## Architecture Overview
//!
//! 1. **Resource Layer** ([`SyncResource`]): names an endpoint and its record/stats types
//! 2. **Runtime Layer** ([`SyncController`]): event loop wiring
//!    [`ResourceStore`], [`DebounceGate`], [`ConcurrencyGuard`], [`AbortRegistry`] and
//!    [`RetryExecutor`]
//! 3. **Interface Layer** ([`SyncHandle`]): commands plus a `watch` view of the state
//! 4. **Network Seam** ([`ResourceTransport`]): [`HttpTransport`] in production,
//!    [`mock`] transports in tests
//!
//! ## Concurrency Model
//!
//! Each controller runs in its own Tokio task and processes commands, fetch completions
//! and the debounce deadline sequentially. Network calls run in spawned tasks and report
//! back by message, so the state itself is never shared.
//!
//! ## Testing
//!
//! See the [`mock`] module for [`MockTransport`](mock::MockTransport) (fluent
//! expectations) and [`create_mock_transport`](mock::create_mock_transport) (answer
//! requests by hand to control interleavings). Timer-driven behavior is tested with
//! `#[tokio::test(start_paused = true)]`.

pub mod cache;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod diagnostics;
pub mod error;
pub mod guard;
pub mod handle;
pub mod message;
pub mod mock;
pub mod query;
pub mod registry;
pub mod resource;
pub mod retry;
pub mod store;
pub mod tracing;
pub mod transport;

// Re-export core types for convenience
pub use cache::{CacheEntry, TtlCache};
pub use config::{CacheConfig, OverlapPolicy, RetryOn, SyncConfig};
pub use controller::SyncController;
pub use debounce::{DebounceGate, Trigger};
pub use diagnostics::{NoopDiagnostics, SyncCounters, SyncDiagnostics, SyncEvent};
pub use error::SyncError;
pub use guard::ConcurrencyGuard;
pub use handle::SyncHandle;
pub use query::{
    FilterValue, Filters, Pagination, PaginationUpdate, ResourceQuery, ServerPagination,
    SortDirection, SortOrder,
};
pub use registry::{AbortRegistry, PendingRequest};
pub use resource::{ResourcePage, SyncResource};
pub use retry::{RetryExecutor, RetryPolicy};
pub use store::{ResourceState, ResourceStore};
pub use transport::{HttpTransport, ResourceTransport, SessionProvider, StaticSession};
