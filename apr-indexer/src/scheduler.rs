//! Periodic APR update driver
//!
//! Every tick lists the persisted networks and runs one cycle per network in
//! parallel. A cycle is awaited before the next tick is taken, and ticks
//! missed meanwhile are skipped, so cycles never overlap.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::core::AprStore;
use crate::services::AprService;

/// Per-cycle network outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub networks: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub struct Scheduler {
    store: Arc<dyn AprStore>,
    service: Arc<AprService>,
    period: Duration,
    max_parallel: usize,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn AprStore>,
        service: Arc<AprService>,
        period: Duration,
        max_parallel: usize,
    ) -> Self {
        Self {
            store,
            service,
            period,
            max_parallel: max_parallel.max(1),
        }
    }

    /// Tick until `shutdown` flips to true; the first tick fires immediately
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(period_secs = self.period.as_secs(), "Starting scheduler");

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Stopping scheduler");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }
    }

    /// One update across all networks; returns once every worker finished
    pub async fn run_cycle(&self) -> CycleSummary {
        info!("Running unified APR update task");

        let networks = match self.store.list_networks().await {
            Ok(networks) => networks,
            Err(e) => {
                error!(error = %e, "Failed to get networks");
                return CycleSummary::default();
            }
        };

        let mut summary = CycleSummary {
            networks: networks.len(),
            ..Default::default()
        };
        let permits = Arc::new(Semaphore::new(self.max_parallel));
        let mut workers = JoinSet::new();

        for network in networks {
            let service = self.service.clone();
            let permits = permits.clone();
            workers.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let outcome = service.update_network(&network).await;
                (network.title, outcome)
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((title, Ok(report))) => {
                    summary.succeeded += 1;
                    info!(
                        network = %title,
                        pools = report.pools,
                        farmings = report.farmings,
                        failed_writes = report.failed_writes,
                        "Updated all APR"
                    );
                }
                Ok((title, Err(e))) => {
                    summary.failed += 1;
                    error!(network = %title, error = %e, "Failed to update all APR");
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(error = %e, "Network worker aborted");
                }
            }
        }

        info!(
            networks = summary.networks,
            failed = summary.failed,
            "Completed unified APR update task for all networks"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NewNetwork;
    use crate::database::MemoryStore;

    fn scheduler(store: Arc<MemoryStore>, period: Duration) -> Scheduler {
        let service = Arc::new(AprService::new(store.clone(), reqwest::Client::new()));
        Scheduler::new(store, service, period, 2)
    }

    #[tokio::test]
    async fn test_cycle_without_networks() {
        let store = Arc::new(MemoryStore::new());
        let summary = scheduler(store, Duration::from_secs(60)).run_cycle().await;
        assert_eq!(summary, CycleSummary::default());
    }

    #[tokio::test]
    async fn test_failing_networks_are_isolated() {
        let store = Arc::new(MemoryStore::new());
        for title in ["Polygon", "Base", "Linea"] {
            store
                .upsert_network(&NewNetwork {
                    title: title.to_string(),
                    analytics_subgraph_url: "http://127.0.0.1:1/analytics".to_string(),
                    farming_subgraph_url: "http://127.0.0.1:1/farming".to_string(),
                    api_key: None,
                })
                .await
                .unwrap();
        }

        let summary = scheduler(store, Duration::from_secs(60)).run_cycle().await;
        assert_eq!(summary.networks, 3);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.succeeded, 0);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let store = Arc::new(MemoryStore::new());
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(scheduler(store, Duration::from_secs(3600)).run(rx));

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }
}
