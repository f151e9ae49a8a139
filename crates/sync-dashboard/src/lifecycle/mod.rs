//! # System Lifecycle
//!
//! Starts, wires and stops the dashboard's synchronized views.
//!
//! Each view is a [`SyncController`](sync_framework::SyncController) running in its own
//! tokio task; the system keeps the typed clients and the task handles. Views do not
//! depend on each other, so start order does not matter. The lookup directory is not a
//! task, just a cache plus a transport, so it needs no shutdown.
//!
//! ## Shutdown
//!
//! 1. Dispose every view: the debounce timer is disarmed and in-flight requests are
//!    cancelled. Late responses cannot reach the state anymore.
//! 2. Await every controller task and report a task that panicked.
//!
//! ## Observability
//!
//! Call [`setup_tracing`](sync_framework::tracing::setup_tracing) once at startup.
//!
//! ```bash
//! RUST_LOG=info cargo run      # Fetches and outcomes
//! RUST_LOG=debug cargo run     # Every command, debounce and discard
//! ```

pub mod dashboard_system;

pub use dashboard_system::*;
