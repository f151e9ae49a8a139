use crate::clients::{NewsClient, SectorClient, ViewClient};
use crate::config::DashboardConfig;
use crate::lookups::LookupDirectory;
use crate::model::{News, Sectors};
use std::sync::Arc;
use sync_framework::{
    NoopDiagnostics, ResourceTransport, RetryExecutor, RetryPolicy, SyncController,
    SyncDiagnostics, TtlCache,
};
use tracing::{error, info};

/// Runtime orchestrator for the dashboard's synchronized views.
///
/// # Example
///
/// ```ignore
/// let system = DashboardSystem::new(&config, transport);
///
/// system.news.search("budget").await?;
/// let locations = system.lookups.get(LookupKind::Locations).await?;
///
/// system.shutdown().await?;
/// ```
pub struct DashboardSystem {
    /// Client for the news view
    pub news: NewsClient,

    /// Client for the sector view
    pub sectors: SectorClient,

    /// Cached reference collections
    pub lookups: LookupDirectory,

    /// Controller tasks (awaited on shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl DashboardSystem {
    /// Spawns every view controller. Must be called inside a tokio runtime.
    pub fn new(config: &DashboardConfig, transport: Arc<dyn ResourceTransport>) -> Self {
        Self::with_diagnostics(config, transport, Arc::new(NoopDiagnostics))
    }

    /// Same as [`new`](Self::new), reporting every view and the lookup cache to
    /// `diagnostics`.
    pub fn with_diagnostics(
        config: &DashboardConfig,
        transport: Arc<dyn ResourceTransport>,
        diagnostics: Arc<dyn SyncDiagnostics>,
    ) -> Self {
        // 1. Create controllers and their handles
        let (news_controller, news_handle) =
            SyncController::<News>::new(config.news.clone(), transport.clone());
        let (sector_controller, sector_handle) =
            SyncController::<Sectors>::new(config.sectors.clone(), transport.clone());

        // 2. Start them
        let news_task = tokio::spawn(news_controller.with_diagnostics(diagnostics.clone()).run());
        let sector_task =
            tokio::spawn(sector_controller.with_diagnostics(diagnostics.clone()).run());

        // 3. Lookups share one cache and use the news retry settings
        let cache = Arc::new(TtlCache::from_config(&config.lookups).with_diagnostics(diagnostics.clone()));
        let executor =
            RetryExecutor::new(RetryPolicy::from_config(&config.news)).with_diagnostics(diagnostics);
        let lookups = LookupDirectory::new(cache, transport, executor);

        info!("Dashboard system started");
        Self {
            news: NewsClient::new(news_handle),
            sectors: SectorClient::new(sector_handle),
            lookups,
            handles: vec![news_task, sector_task],
        }
    }

    /// Disposes every view and waits for the controller tasks.
    ///
    /// Returns `Err` if a controller task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down dashboard...");

        self.news.dispose().await;
        self.sectors.dispose().await;
        drop(self.news);
        drop(self.sectors);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Controller task failed: {:?}", e);
                return Err(format!("Controller task failed: {:?}", e));
            }
        }

        info!("Dashboard shutdown complete.");
        Ok(())
    }
}
