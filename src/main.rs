use std::sync::Arc;

use tracing::{info, warn};

use rentwatch::config::Config;
use rentwatch::engine::{Engine, InMemoryCatalog};
use rentwatch::snapshot::{self, SnapshotStore};
use rentwatch::sweeper;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    rentwatch::observability::init(config.metrics_port);

    let store = SnapshotStore::new(config.snapshot_path.clone(), config.utc_offset);
    // Catalog is read once; a missing products section only costs enrichment
    let catalog = match snapshot::load_catalog(&config.snapshot_path).await {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!("product catalog unavailable, continuing without metadata: {e}");
            InMemoryCatalog::new()
        }
    };

    info!("rentwatch started");
    info!("  snapshot: {}", config.snapshot_path.display());
    info!("  products: {}", catalog.len());
    info!("  sweep_interval: {}s", config.sweep_interval.as_secs());
    info!("  utc_offset: {}", config.utc_offset);
    info!("  overdue_lookback_days: {}", config.overdue_lookback_days);
    info!("  metrics: {}", config.metrics_port.map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics")));

    let engine = Arc::new(Engine::new(Arc::new(store), Arc::new(catalog), config.engine_config()));
    let sweeper = tokio::spawn(sweeper::run_sweeper(
        engine,
        config.sweep_interval,
        config.utc_offset,
    ));

    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to register SIGTERM handler");
            tokio::select! {
                _ = ctrl_c => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
        }
    };
    shutdown.await;

    info!("shutdown signal received, stopping sweeper");
    sweeper.abort();
    info!("rentwatch stopped");
    Ok(())
}
