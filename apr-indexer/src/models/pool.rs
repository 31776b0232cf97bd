//! Pool, token and daily fee records from the analytics indexer

use super::numeric::{lenient_f64, lenient_i32};
use super::{Cursor, Page};
use serde::Deserialize;

/// Token metadata
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamToken {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(deserialize_with = "lenient_i32")]
    pub decimals: i32,
    /// Price in the network's native unit
    #[serde(deserialize_with = "lenient_f64")]
    pub derived_matic: f64,
}

/// Pool snapshot
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamPool {
    pub id: String,
    #[serde(deserialize_with = "lenient_i32")]
    pub tick: i32,
    pub token0: UpstreamToken,
    pub token1: UpstreamToken,
    /// Ratio token1/token0
    #[serde(deserialize_with = "lenient_f64")]
    pub token0_price: f64,
    /// Total active liquidity
    #[serde(deserialize_with = "lenient_f64")]
    pub liquidity: f64,
}

impl UpstreamPool {
    /// Display title used when a pool row is first created
    pub fn title(&self) -> String {
        format!("{} : {}", self.token0.name, self.token1.name)
    }
}

impl Cursor for UpstreamPool {
    fn cursor(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoolRef {
    pub id: String,
}

/// One day of fee totals for a pool
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolDayData {
    pub id: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub fees_token0: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub fees_token1: f64,
    pub date: i64,
    pub pool: PoolRef,
}

impl PoolDayData {
    /// Fees in token0 units, valuing token1 fees at `token0_price`
    pub fn fees_in_token0(&self, token0_price: f64) -> f64 {
        self.fees_token0 + self.fees_token1 * token0_price
    }
}

impl Cursor for PoolDayData {
    fn cursor(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PoolsPage {
    pub pools: Vec<UpstreamPool>,
}

impl Page for PoolsPage {
    type Item = UpstreamPool;

    fn into_items(self) -> Vec<UpstreamPool> {
        self.pools
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolDayDatasPage {
    pub pool_day_datas: Vec<PoolDayData>,
}

impl Page for PoolDayDatasPage {
    type Item = PoolDayData;

    fn into_items(self) -> Vec<PoolDayData> {
        self.pool_day_datas
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokensResponse {
    pub tokens: Vec<UpstreamToken>,
}
