//! PostgreSQL store with runtime queries (no compile-time checking)

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::info;

use crate::core::{AprStore, Farming, FarmingUpsert, IndexerResult, Network, NewNetwork, Pool, PoolUpsert};

#[derive(Clone)]
pub struct PostgresStore {
    pub pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(options: PgConnectOptions, max_connections: u32) -> IndexerResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        info!(max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AprStore for PostgresStore {
    async fn upsert_network(&self, network: &NewNetwork) -> IndexerResult<Network> {
        let query = r#"
            INSERT INTO networks (title, analytics_subgraph_url, farming_subgraph_url, api_key)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (title) DO UPDATE SET
                analytics_subgraph_url = EXCLUDED.analytics_subgraph_url,
                farming_subgraph_url = EXCLUDED.farming_subgraph_url,
                api_key = EXCLUDED.api_key,
                updated_at = NOW()
            RETURNING id, title, analytics_subgraph_url, farming_subgraph_url, api_key, created_at, updated_at
        "#;

        let row = sqlx::query_as::<_, Network>(query)
            .bind(&network.title)
            .bind(&network.analytics_subgraph_url)
            .bind(&network.farming_subgraph_url)
            .bind(&network.api_key)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn upsert_pool(&self, network_id: i64, pool: &PoolUpsert) -> IndexerResult<()> {
        // Title is only written on insert; absent metrics keep their stored value
        let query = r#"
            INSERT INTO pools (title, address, last_apr, max_apr, network_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (network_id, address) DO UPDATE SET
                last_apr = COALESCE(EXCLUDED.last_apr, pools.last_apr),
                max_apr = COALESCE(EXCLUDED.max_apr, pools.max_apr),
                updated_at = NOW()
        "#;

        sqlx::query(query)
            .bind(&pool.title)
            .bind(&pool.address)
            .bind(pool.last_apr)
            .bind(pool.max_apr)
            .bind(network_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn upsert_farming(&self, network_id: i64, farming: &FarmingUpsert) -> IndexerResult<()> {
        let query = r#"
            INSERT INTO farmings (hash, tvl, last_apr, max_apr, network_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (network_id, hash) DO UPDATE SET
                tvl = COALESCE(EXCLUDED.tvl, farmings.tvl),
                last_apr = COALESCE(EXCLUDED.last_apr, farmings.last_apr),
                max_apr = COALESCE(EXCLUDED.max_apr, farmings.max_apr),
                updated_at = NOW()
        "#;

        sqlx::query(query)
            .bind(&farming.hash)
            .bind(farming.tvl)
            .bind(farming.last_apr)
            .bind(farming.max_apr)
            .bind(network_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_networks(&self) -> IndexerResult<Vec<Network>> {
        let rows = sqlx::query_as::<_, Network>(
            "SELECT id, title, analytics_subgraph_url, farming_subgraph_url, api_key, created_at, updated_at \
             FROM networks ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_pools_by_network_name(&self, name: &str) -> IndexerResult<Vec<Pool>> {
        let query = r#"
            SELECT p.id, p.title, p.address, p.last_apr, p.max_apr, p.network_id, p.created_at, p.updated_at
            FROM pools p
            JOIN networks n ON n.id = p.network_id
            WHERE n.title = $1
            ORDER BY p.address
        "#;

        let rows = sqlx::query_as::<_, Pool>(query)
            .bind(name)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_farmings_by_network_name(&self, name: &str) -> IndexerResult<Vec<Farming>> {
        let query = r#"
            SELECT f.id, f.hash, f.tvl, f.last_apr, f.max_apr, f.network_id, f.created_at, f.updated_at
            FROM farmings f
            JOIN networks n ON n.id = f.network_id
            WHERE n.title = $1
            ORDER BY f.hash
        "#;

        let rows = sqlx::query_as::<_, Farming>(query)
            .bind(name)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn health_check(&self) -> IndexerResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
