//! Core trait abstractions (ports)

use async_trait::async_trait;
use serde_json::Value;

use super::error::IndexerResult;
use super::types::*;

/// Storage port for networks and their computed metrics
#[async_trait]
pub trait AprStore: Send + Sync {
    /// Insert or update a network by its unique title
    async fn upsert_network(&self, network: &NewNetwork) -> IndexerResult<Network>;

    /// Insert or update a pool by (network, address)
    async fn upsert_pool(&self, network_id: i64, pool: &PoolUpsert) -> IndexerResult<()>;

    /// Insert or update a farming by (network, hash)
    async fn upsert_farming(&self, network_id: i64, farming: &FarmingUpsert) -> IndexerResult<()>;

    async fn list_networks(&self) -> IndexerResult<Vec<Network>>;

    /// Pools of the network with this title; empty when no such network exists
    async fn list_pools_by_network_name(&self, name: &str) -> IndexerResult<Vec<Pool>>;

    /// Farmings of the network with this title; empty when no such network exists
    async fn list_farmings_by_network_name(&self, name: &str) -> IndexerResult<Vec<Farming>>;

    async fn health_check(&self) -> IndexerResult<()>;
}

/// One-shot GraphQL request against a single endpoint
#[async_trait]
pub trait GraphQLExecutor: Send + Sync {
    /// Run `query` and return the response's `data` member
    async fn execute(&self, query: &str, variables: Value) -> IndexerResult<Value>;
}
