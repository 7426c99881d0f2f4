//! skygauged — wiring for the skygauge daemon.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Prometheus exposition, one gather per request |
//! | GET | `/healthz` | Liveness |

pub mod server;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use skygauge_collector::{
    StaticInventory, SubnetCollector, SubnetConfig, UpdateCollector, UpdateConfig,
};
use skygauge_core::SkygaugeConfig;
use skygauge_metrics::Registry;

pub use server::{ExpositionState, build_router};

/// The registry plus handles the daemon needs beyond collection.
pub struct Collectors {
    pub registry: Registry,
    pub subnet: Option<Arc<SubnetCollector>>,
}

/// Build and register every collector enabled in `config`.
pub fn build_collectors(config: &SkygaugeConfig, inventory: StaticInventory) -> anyhow::Result<Collectors> {
    let inventory = Arc::new(inventory);
    let mut registry = Registry::new();
    let mut subnet = None;

    if config.collectors.subnet {
        let collector = Arc::new(SubnetCollector::new(SubnetConfig {
            discovery: Some(inventory.clone()),
            installation_name: config.installation.name.clone(),
            cache_ttl: Some(config.subnet_cache_ttl()?),
        })?);
        registry.register(collector.clone())?;
        subnet = Some(collector);
    }

    if config.collectors.update {
        let collector = UpdateCollector::new(UpdateConfig {
            cluster_api: Some(inventory),
        })?;
        registry.register(Arc::new(collector))?;
    }

    info!(
        collectors = registry.len(),
        installation = %config.installation.name,
        "collectors registered"
    );
    Ok(Collectors { registry, subnet })
}

/// Periodically drop expired subnet snapshots until shutdown.
pub async fn run_cache_janitor(
    subnet: Arc<SubnetCollector>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!(interval_secs = interval.as_secs(), "cache janitor started");
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                let purged = subnet.purge_expired();
                let stats = subnet.cache_stats();
                debug!(
                    purged,
                    hits = stats.hits,
                    misses = stats.misses,
                    expirations = stats.expirations,
                    "subnet cache swept"
                );
            }
            _ = shutdown.changed() => {
                debug!("cache janitor shutting down");
                break;
            }
        }
    }
}
