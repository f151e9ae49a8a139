//! # Dashboard Sync
//!
//! Starts the dashboard views against the configured API, loads the first page of
//! news and sectors plus the reference collections, and shuts down.
//!
//! ```bash
//! DASHBOARD_API_BASE=https://api.example.org DASHBOARD_ACCESS_TOKEN=... RUST_LOG=info cargo run
//! ```

use std::sync::Arc;
use std::time::Duration;
use sync_dashboard::clients::ViewClient;
use sync_dashboard::config::DashboardConfig;
use sync_dashboard::lifecycle::DashboardSystem;
use sync_dashboard::model::{LookupKind, NewsCategory};
use sync_framework::tracing::setup_tracing;
use sync_framework::{HttpTransport, SessionProvider, StaticSession, SyncCounters};
use tracing::{error, info, warn, Instrument};

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = DashboardConfig::from_env();
    info!(api_base = %config.api_base, "Starting dashboard sync");

    let session: Arc<dyn SessionProvider> = match &config.access_token {
        Some(token) => Arc::new(StaticSession::new(token.clone())),
        None => {
            warn!("DASHBOARD_ACCESS_TOKEN is not set, requests will be rejected");
            Arc::new(StaticSession::anonymous())
        }
    };
    let transport = Arc::new(HttpTransport::new(config.api_base.clone(), session));
    let counters = Arc::new(SyncCounters::new());
    let system = DashboardSystem::with_diagnostics(&config, transport, counters.clone());

    let span = tracing::info_span!("initial_load");
    async {
        match tokio::time::timeout(LOAD_TIMEOUT, system.news.settled()).await {
            Ok(Ok(state)) => match state.error {
                Some(e) => error!(error = %e, "News failed to load"),
                None => info!(
                    items = state.data.len(),
                    total = state.pagination.total_count,
                    "News loaded"
                ),
            },
            Ok(Err(e)) => error!(error = %e, "News view stopped"),
            Err(_) => error!("Timed out waiting for news"),
        }
        match tokio::time::timeout(LOAD_TIMEOUT, system.sectors.settled()).await {
            Ok(Ok(state)) => info!(sectors = state.data.len(), error = ?state.error, "Sectors settled"),
            Ok(Err(e)) => error!(error = %e, "Sector view stopped"),
            Err(_) => error!("Timed out waiting for sectors"),
        }
    }
    .instrument(span)
    .await;

    let span = tracing::info_span!("events");
    async {
        if let Err(e) = system.news.filter_by_category(Some(NewsCategory::Event)).await {
            error!(error = %e, "Could not filter news");
            return;
        }
        if let Ok(Ok(state)) = tokio::time::timeout(LOAD_TIMEOUT, system.news.settled()).await {
            info!(events = state.data.len(), "Event listing loaded");
        }
    }
    .instrument(span)
    .await;

    for kind in LookupKind::ALL {
        match system.lookups.get(kind).await {
            Ok(items) => info!(%kind, count = items.len(), "Lookup ready"),
            Err(e) => error!(error = %e, "Lookup failed"),
        }
    }

    info!(
        fetches = counters.fetches_started(),
        dropped = counters.fetches_dropped(),
        retries = counters.retries(),
        failed = counters.failed(),
        "Sync counters"
    );

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
