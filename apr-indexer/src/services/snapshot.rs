//! Per-network snapshot fetch
//!
//! Each paginated dataset is pulled with a keyset loop: request `first` rows
//! with ids greater than the last seen id, stop on an empty or short page.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

use crate::core::{GraphQLExecutor, IndexerError, IndexerResult};
use crate::graphql::queries;
use crate::models::{
    Cursor, DepositsPage, EternalFarming, EternalFarmingsPage, FarmingDeposit, Page, PoolDayData,
    PoolDayDatasPage, PoolsPage, Position, PositionsPage, TokensResponse, UpstreamPool, UpstreamToken,
};

pub const DEFAULT_PAGE_SIZE: usize = 1000;

const SECONDS_PER_DAY: i64 = 86_400;

/// Everything one cycle needs from the two upstream endpoints
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub pools: Vec<UpstreamPool>,
    pub pool_day_datas: Vec<PoolDayData>,
    pub positions: Vec<Position>,
    pub eternal_farmings: Vec<EternalFarming>,
    pub deposits: Vec<FarmingDeposit>,
    pub tokens: Vec<UpstreamToken>,
}

/// Midnight UTC of the day before `now`, in seconds
pub fn yesterday_start(now: DateTime<Utc>) -> i64 {
    (now.timestamp() - SECONDS_PER_DAY).div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY
}

/// Distinct reward and bonus token addresses, zero address excluded
pub fn reward_token_addresses(farmings: &[EternalFarming]) -> Vec<String> {
    farmings
        .iter()
        .flat_map(|farming| farming.reward_tokens())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub struct SnapshotFetcher<'a> {
    analytics: &'a dyn GraphQLExecutor,
    farming: &'a dyn GraphQLExecutor,
    page_size: usize,
}

impl<'a> SnapshotFetcher<'a> {
    pub fn new(analytics: &'a dyn GraphQLExecutor, farming: &'a dyn GraphQLExecutor) -> Self {
        Self {
            analytics,
            farming,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetch the six datasets in order; the first failure aborts the fetch
    pub async fn fetch(&self, now: DateTime<Utc>) -> IndexerResult<Snapshot> {
        let pools = self.fetch_pools().await?;
        let pool_day_datas = self.fetch_pool_day_datas(yesterday_start(now)).await?;
        let positions = self.fetch_positions().await?;
        let eternal_farmings = self.fetch_eternal_farmings().await?;
        let deposits = self.fetch_deposits().await?;
        let tokens = self
            .fetch_tokens(&reward_token_addresses(&eternal_farmings))
            .await?;

        Ok(Snapshot {
            pools,
            pool_day_datas,
            positions,
            eternal_farmings,
            deposits,
            tokens,
        })
    }

    pub async fn fetch_pools(&self) -> IndexerResult<Vec<UpstreamPool>> {
        self.paginate::<PoolsPage>(self.analytics, queries::POOLS, Map::new())
            .await
    }

    pub async fn fetch_pool_day_datas(&self, date: i64) -> IndexerResult<Vec<PoolDayData>> {
        let mut extra = Map::new();
        extra.insert("date".to_string(), json!(date));
        self.paginate::<PoolDayDatasPage>(self.analytics, queries::POOL_DAY_DATAS, extra)
            .await
    }

    pub async fn fetch_positions(&self) -> IndexerResult<Vec<Position>> {
        self.paginate::<PositionsPage>(self.analytics, queries::POSITIONS, Map::new())
            .await
    }

    pub async fn fetch_eternal_farmings(&self) -> IndexerResult<Vec<EternalFarming>> {
        self.paginate::<EternalFarmingsPage>(self.farming, queries::ETERNAL_FARMINGS, Map::new())
            .await
    }

    pub async fn fetch_deposits(&self) -> IndexerResult<Vec<FarmingDeposit>> {
        self.paginate::<DepositsPage>(self.farming, queries::FARMING_DEPOSITS, Map::new())
            .await
    }

    /// Token metadata in one request; no request at all for an empty list
    pub async fn fetch_tokens(&self, addresses: &[String]) -> IndexerResult<Vec<UpstreamToken>> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }
        let data = self
            .analytics
            .execute(queries::TOKENS, json!({ "addresses": addresses }))
            .await?;
        Ok(decode::<TokensResponse>(data)?.tokens)
    }

    async fn paginate<P: Page>(
        &self,
        executor: &dyn GraphQLExecutor,
        query: &str,
        extra: Map<String, Value>,
    ) -> IndexerResult<Vec<P::Item>> {
        let mut items = Vec::new();
        let mut last_id = "0".to_string();

        loop {
            let mut variables = extra.clone();
            variables.insert("first".to_string(), json!(self.page_size));
            variables.insert("id_gt".to_string(), json!(last_id));

            let data = executor.execute(query, Value::Object(variables)).await?;
            let batch = decode::<P>(data)?.into_items();
            let count = batch.len();

            let Some(last) = batch.last() else {
                break;
            };
            last_id = last.cursor().to_string();
            items.extend(batch);
            debug!(fetched = items.len(), cursor = %last_id, "page received");

            if count < self.page_size {
                break;
            }
        }

        Ok(items)
    }
}

fn decode<T: serde::de::DeserializeOwned>(data: Value) -> IndexerResult<T> {
    if data.is_null() {
        return Err(IndexerError::Decode("response carried no data".to_string()));
    }
    Ok(serde_json::from_value(data)?)
}
