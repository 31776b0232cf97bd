//! In-process store with the same upsert semantics as Postgres

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::core::{
    AprStore, Farming, FarmingUpsert, IndexerError, IndexerResult, Network, NewNetwork, Pool, PoolUpsert,
    StorageError,
};

#[derive(Debug, Default)]
struct Tables {
    networks: Vec<Network>,
    pools: Vec<Pool>,
    farmings: Vec<Farming>,
    next_id: i64,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn network_id(&self, title: &str) -> Option<i64> {
        self.networks.iter().find(|n| n.title == title).map(|n| n.id)
    }

    fn ensure_network(&self, network_id: i64) -> IndexerResult<()> {
        if self.networks.iter().any(|n| n.id == network_id) {
            Ok(())
        } else {
            Err(IndexerError::Storage(StorageError::Database(format!(
                "network {network_id} does not exist"
            ))))
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AprStore for MemoryStore {
    async fn upsert_network(&self, network: &NewNetwork) -> IndexerResult<Network> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        if let Some(existing) = tables.networks.iter_mut().find(|n| n.title == network.title) {
            existing.analytics_subgraph_url = network.analytics_subgraph_url.clone();
            existing.farming_subgraph_url = network.farming_subgraph_url.clone();
            existing.api_key = network.api_key.clone();
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let row = Network {
            id: tables.allocate_id(),
            title: network.title.clone(),
            analytics_subgraph_url: network.analytics_subgraph_url.clone(),
            farming_subgraph_url: network.farming_subgraph_url.clone(),
            api_key: network.api_key.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.networks.push(row.clone());
        Ok(row)
    }

    async fn upsert_pool(&self, network_id: i64, pool: &PoolUpsert) -> IndexerResult<()> {
        let mut tables = self.tables.write().await;
        tables.ensure_network(network_id)?;
        let now = Utc::now();

        if let Some(existing) = tables
            .pools
            .iter_mut()
            .find(|p| p.network_id == network_id && p.address == pool.address)
        {
            existing.last_apr = pool.last_apr.or(existing.last_apr);
            existing.max_apr = pool.max_apr.or(existing.max_apr);
            existing.updated_at = now;
            return Ok(());
        }

        let row = Pool {
            id: tables.allocate_id(),
            title: pool.title.clone(),
            address: pool.address.clone(),
            last_apr: pool.last_apr,
            max_apr: pool.max_apr,
            network_id,
            created_at: now,
            updated_at: now,
        };
        tables.pools.push(row);
        Ok(())
    }

    async fn upsert_farming(&self, network_id: i64, farming: &FarmingUpsert) -> IndexerResult<()> {
        let mut tables = self.tables.write().await;
        tables.ensure_network(network_id)?;
        let now = Utc::now();

        if let Some(existing) = tables
            .farmings
            .iter_mut()
            .find(|f| f.network_id == network_id && f.hash == farming.hash)
        {
            existing.tvl = farming.tvl.or(existing.tvl);
            existing.last_apr = farming.last_apr.or(existing.last_apr);
            existing.max_apr = farming.max_apr.or(existing.max_apr);
            existing.updated_at = now;
            return Ok(());
        }

        // Hashes are globally unique, as in the relational schema
        if tables.farmings.iter().any(|f| f.hash == farming.hash) {
            return Err(IndexerError::Storage(StorageError::Database(format!(
                "farming {} already belongs to another network",
                farming.hash
            ))));
        }

        let row = Farming {
            id: tables.allocate_id(),
            hash: farming.hash.clone(),
            tvl: farming.tvl,
            last_apr: farming.last_apr,
            max_apr: farming.max_apr,
            network_id,
            created_at: now,
            updated_at: now,
        };
        tables.farmings.push(row);
        Ok(())
    }

    async fn list_networks(&self) -> IndexerResult<Vec<Network>> {
        Ok(self.tables.read().await.networks.clone())
    }

    async fn list_pools_by_network_name(&self, name: &str) -> IndexerResult<Vec<Pool>> {
        let tables = self.tables.read().await;
        let Some(network_id) = tables.network_id(name) else {
            return Ok(Vec::new());
        };
        let mut pools: Vec<Pool> = tables
            .pools
            .iter()
            .filter(|p| p.network_id == network_id)
            .cloned()
            .collect();
        pools.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(pools)
    }

    async fn list_farmings_by_network_name(&self, name: &str) -> IndexerResult<Vec<Farming>> {
        let tables = self.tables.read().await;
        let Some(network_id) = tables.network_id(name) else {
            return Ok(Vec::new());
        };
        let mut farmings: Vec<Farming> = tables
            .farmings
            .iter()
            .filter(|f| f.network_id == network_id)
            .cloned()
            .collect();
        farmings.sort_by(|a, b| a.hash.cmp(&b.hash));
        Ok(farmings)
    }

    async fn health_check(&self) -> IndexerResult<()> {
        Ok(())
    }
}
