//! Business logic services
//!
//! `AprService` runs one network cycle: fetch the upstream snapshot, run the
//! four kernel passes in order, and upsert each result row by row.

pub mod apr;
pub mod snapshot;

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::core::{AprStore, FarmingUpsert, IndexerResult, Network, PoolUpsert};
use crate::graphql::GraphQLClient;
use apr::{farming_last_apr, farming_max_apr, pool_last_apr, pool_max_apr, reward_rate, SnapshotIndex};
pub use snapshot::{Snapshot, SnapshotFetcher, DEFAULT_PAGE_SIZE};

/// Outcome of one network cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub pools: usize,
    pub farmings: usize,
    /// Row upserts that failed and were skipped
    pub failed_writes: usize,
}

pub struct AprService {
    store: Arc<dyn AprStore>,
    http: reqwest::Client,
    page_size: usize,
}

impl AprService {
    pub fn new(store: Arc<dyn AprStore>, http: reqwest::Client) -> Self {
        Self {
            store,
            http,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Fetch, compute and persist every metric for one network
    pub async fn update_network(&self, network: &Network) -> IndexerResult<CycleReport> {
        let started = Instant::now();
        info!(network = %network.title, "Starting full APR update");

        let analytics = GraphQLClient::new(
            self.http.clone(),
            network.analytics_subgraph_url.as_str(),
            network.api_key.clone(),
        );
        let farming = GraphQLClient::new(
            self.http.clone(),
            network.farming_subgraph_url.as_str(),
            network.api_key.clone(),
        );

        let snapshot = SnapshotFetcher::new(&analytics, &farming)
            .with_page_size(self.page_size)
            .fetch(Utc::now())
            .await?;

        info!(
            network = %network.title,
            pools = snapshot.pools.len(),
            positions = snapshot.positions.len(),
            pool_day_datas = snapshot.pool_day_datas.len(),
            farmings = snapshot.eternal_farmings.len(),
            deposits = snapshot.deposits.len(),
            reward_tokens = snapshot.tokens.len(),
            "Fetched all data"
        );

        let report = self.write_back(network, &snapshot).await;

        info!(
            network = %network.title,
            failed_writes = report.failed_writes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Completed full APR update"
        );
        Ok(report)
    }

    /// Run the four passes over `snapshot` and upsert their results
    pub async fn write_back(&self, network: &Network, snapshot: &Snapshot) -> CycleReport {
        let index = SnapshotIndex::build(snapshot);
        if index.missing_positions() > 0 {
            warn!(
                network = %network.title,
                missing = index.missing_positions(),
                "Farming deposits reference unknown positions"
            );
        }

        let mut report = CycleReport {
            pools: snapshot.pools.len(),
            farmings: snapshot.eternal_farmings.len(),
            failed_writes: 0,
        };

        info!(network = %network.title, "Processing pools APR");
        for pool in &snapshot.pools {
            let apr = pool_last_apr(pool, index.pool_positions(&pool.id), index.day_data(&pool.id));
            let row = PoolUpsert::last_apr(&pool.id, pool.title(), apr);
            self.write_pool(network, &row, &mut report).await;
        }

        info!(network = %network.title, "Processing pools max APR");
        for pool in &snapshot.pools {
            let apr = pool_max_apr(pool, index.pool_positions(&pool.id), index.day_data(&pool.id));
            let row = PoolUpsert::max_apr(&pool.id, pool.title(), apr);
            self.write_pool(network, &row, &mut report).await;
        }

        info!(network = %network.title, "Processing farmings APR");
        for farming in &snapshot.eternal_farmings {
            let rate = reward_rate(farming, |address| index.token(address));
            let last = farming_last_apr(rate, index.farming_positions(&farming.id));
            let row = FarmingUpsert::last_apr(&farming.id, last.apr, last.tvl);
            self.write_farming(network, &row, &mut report).await;
        }

        info!(network = %network.title, "Processing farmings max APR");
        for farming in &snapshot.eternal_farmings {
            let rate = reward_rate(farming, |address| index.token(address));
            let apr = farming_max_apr(rate, index.farming_positions(&farming.id));
            let row = FarmingUpsert::max_apr(&farming.id, apr);
            self.write_farming(network, &row, &mut report).await;
        }

        report
    }

    async fn write_pool(&self, network: &Network, row: &PoolUpsert, report: &mut CycleReport) {
        if let Err(e) = self.store.upsert_pool(network.id, row).await {
            error!(network = %network.title, address = %row.address, error = %e, "Failed to upsert pool");
            report.failed_writes += 1;
        }
    }

    async fn write_farming(&self, network: &Network, row: &FarmingUpsert, report: &mut CycleReport) {
        if let Err(e) = self.store.upsert_farming(network.id, row).await {
            error!(network = %network.title, hash = %row.hash, error = %e, "Failed to upsert farming");
            report.failed_writes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NewNetwork;
    use crate::database::MemoryStore;
    use crate::models::{
        EternalFarming, FarmingDeposit, PoolDayData, PoolRef, Position, TickRef, UpstreamPool,
        UpstreamToken, ZERO_ADDRESS,
    };
    use approx::assert_relative_eq;

    fn token(id: &str, name: &str) -> UpstreamToken {
        UpstreamToken {
            id: id.to_string(),
            name: name.to_string(),
            symbol: name.to_string(),
            decimals: 18,
            derived_matic: 1.0,
        }
    }

    fn snapshot() -> Snapshot {
        let pool = UpstreamPool {
            id: "0xPOOL".to_string(),
            tick: 1500,
            token0: token("0xt0", "Alpha"),
            token1: token("0xt1", "Beta"),
            token0_price: 2.0,
            liquidity: 1e18,
        };
        let position = Position {
            id: "1".to_string(),
            liquidity: 1e18,
            tick_lower: TickRef { tick_idx: 1000 },
            tick_upper: TickRef { tick_idx: 2000 },
            pool: pool.clone(),
            owner: "0xowner".to_string(),
        };
        Snapshot {
            pools: vec![pool],
            pool_day_datas: vec![PoolDayData {
                id: "0xPOOL-1".to_string(),
                fees_token0: 100.0,
                fees_token1: 50.0,
                date: 0,
                pool: PoolRef { id: "0xPOOL".to_string() },
            }],
            positions: vec![position],
            eternal_farmings: vec![
                EternalFarming {
                    id: "0xfarm-active".to_string(),
                    reward_token: "0xreward".to_string(),
                    bonus_reward_token: ZERO_ADDRESS.to_string(),
                    reward_rate: 1e18,
                    bonus_reward_rate: 1e30,
                    pool: "0xPOOL".to_string(),
                },
                EternalFarming {
                    id: "0xfarm-idle".to_string(),
                    reward_token: "0xreward".to_string(),
                    bonus_reward_token: ZERO_ADDRESS.to_string(),
                    reward_rate: 1e18,
                    bonus_reward_rate: 0.0,
                    pool: "0xPOOL".to_string(),
                },
            ],
            deposits: vec![
                FarmingDeposit {
                    position_id: "1".to_string(),
                    eternal_farming: "0xfarm-active".to_string(),
                },
                FarmingDeposit {
                    position_id: "missing".to_string(),
                    eternal_farming: "0xfarm-idle".to_string(),
                },
            ],
            tokens: vec![token("0xreward", "Reward")],
        }
    }

    async fn setup() -> (Arc<MemoryStore>, AprService, Network) {
        let store = Arc::new(MemoryStore::new());
        let network = store
            .upsert_network(&NewNetwork {
                title: "Polygon".to_string(),
                analytics_subgraph_url: "http://127.0.0.1:1/analytics".to_string(),
                farming_subgraph_url: "http://127.0.0.1:1/farming".to_string(),
                api_key: None,
            })
            .await
            .unwrap();
        let service = AprService::new(store.clone(), reqwest::Client::new());
        (store, service, network)
    }

    #[tokio::test]
    async fn test_write_back_persists_all_metrics() {
        let (store, service, network) = setup().await;
        let snapshot = snapshot();

        let report = service.write_back(&network, &snapshot).await;
        assert_eq!(report, CycleReport { pools: 1, farmings: 2, failed_writes: 0 });

        let pools = store.list_pools_by_network_name("Polygon").await.unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].address, "0xpool");
        assert_eq!(pools[0].title, "Alpha : Beta");
        let last = pools[0].last_apr.unwrap();
        assert!(last > 0.0);
        assert_relative_eq!(pools[0].max_apr.unwrap(), last, max_relative = 1e-12);

        let farmings = store.list_farmings_by_network_name("Polygon").await.unwrap();
        let active = farmings.iter().find(|f| f.hash == "0xfarm-active").unwrap();
        let idle = farmings.iter().find(|f| f.hash == "0xfarm-idle").unwrap();

        let tvl = snapshot.positions[0].native_value();
        assert_relative_eq!(active.tvl.unwrap(), tvl, max_relative = 1e-12);
        // Bonus rate is ignored because the bonus token is the zero address
        assert_relative_eq!(
            active.last_apr.unwrap(),
            1.0 * 31_536_000.0 / tvl * 100.0,
            max_relative = 1e-9
        );

        assert_eq!(idle.last_apr, Some(-1.0));
        assert_eq!(idle.tvl, Some(0.0));
        assert_eq!(idle.max_apr, Some(0.0));
    }

    #[tokio::test]
    async fn test_write_back_is_idempotent() {
        let (store, service, network) = setup().await;
        let snapshot = snapshot();

        service.write_back(&network, &snapshot).await;
        let pools_first = store.list_pools_by_network_name("Polygon").await.unwrap();
        let farmings_first = store.list_farmings_by_network_name("Polygon").await.unwrap();

        service.write_back(&network, &snapshot).await;
        let pools_second = store.list_pools_by_network_name("Polygon").await.unwrap();
        let farmings_second = store.list_farmings_by_network_name("Polygon").await.unwrap();

        let metrics = |p: &crate::core::Pool| (p.id, p.address.clone(), p.title.clone(), p.last_apr, p.max_apr);
        assert_eq!(
            pools_first.iter().map(metrics).collect::<Vec<_>>(),
            pools_second.iter().map(metrics).collect::<Vec<_>>()
        );
        let metrics = |f: &crate::core::Farming| (f.id, f.hash.clone(), f.tvl, f.last_apr, f.max_apr);
        assert_eq!(
            farmings_first.iter().map(metrics).collect::<Vec<_>>(),
            farmings_second.iter().map(metrics).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_unreachable_upstream_fails_cycle_without_writes() {
        let (store, service, network) = setup().await;

        let err = service.update_network(&network).await.unwrap_err();
        assert!(err.is_upstream());
        assert!(store.list_pools_by_network_name("Polygon").await.unwrap().is_empty());
    }
}
