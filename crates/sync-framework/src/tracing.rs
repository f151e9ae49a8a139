//! # Observability & Tracing
//!
//! The [`setup_tracing`] function installs the `tracing` subscriber used by the
//! dashboard binary and by anyone embedding the controllers.
//!
//! ## What Gets Traced
//!
//! - **Controller lifecycle**: start, teardown, stop (with the record count it ended on)
//! - **Fetches**: issued (`request_id`, page, limit), applied, failed, dropped, superseded
//! - **Retries**: each failed attempt with its backoff delay
//! - **Cache**: misses and forced refreshes
//!
//! Every controller event carries an `endpoint` field, so one resource can be isolated:
//!
//! ```bash
//! RUST_LOG=info cargo run -p sync-dashboard
//! RUST_LOG=sync_framework=debug cargo run -p sync-dashboard
//! ```
//!
//! With `RUST_LOG=info` a first load looks like:
//!
//! ```text
//! INFO Controller started endpoint="news"
//! INFO Fetching endpoint="news" request_id=1 page=1 limit=20
//! INFO Applied endpoint="news" request_id=1 records=20
//! ```
//!
//! `trace` additionally dumps every published state.

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
///
/// Call once per process. Module paths are hidden; the `endpoint` field identifies the
/// resource instead.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
