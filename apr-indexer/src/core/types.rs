//! Persisted row types and write requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upstream endpoint pair for one blockchain network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Network {
    pub id: i64,
    pub title: String,
    pub analytics_subgraph_url: String,
    pub farming_subgraph_url: String,
    pub api_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Pool {
    pub id: i64,
    pub title: String,
    pub address: String,
    pub last_apr: Option<f64>,
    pub max_apr: Option<f64>,
    pub network_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Farming {
    pub id: i64,
    pub hash: String,
    pub tvl: Option<f64>,
    pub last_apr: Option<f64>,
    pub max_apr: Option<f64>,
    pub network_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Network definition as it appears in configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNetwork {
    pub title: String,
    pub analytics_subgraph_url: String,
    pub farming_subgraph_url: String,
    pub api_key: Option<String>,
}

/// Pool write; `None` metrics leave the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolUpsert {
    pub address: String,
    /// Only used when the row is created
    pub title: String,
    pub last_apr: Option<f64>,
    pub max_apr: Option<f64>,
}

impl PoolUpsert {
    pub fn last_apr(address: &str, title: String, apr: f64) -> Self {
        Self {
            address: address.to_lowercase(),
            title,
            last_apr: Some(apr),
            max_apr: None,
        }
    }

    pub fn max_apr(address: &str, title: String, apr: f64) -> Self {
        Self {
            address: address.to_lowercase(),
            title,
            last_apr: None,
            max_apr: Some(apr),
        }
    }
}

/// Farming write; `None` metrics leave the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FarmingUpsert {
    pub hash: String,
    pub tvl: Option<f64>,
    pub last_apr: Option<f64>,
    pub max_apr: Option<f64>,
}

impl FarmingUpsert {
    pub fn last_apr(hash: &str, apr: f64, tvl: f64) -> Self {
        Self {
            hash: hash.to_lowercase(),
            tvl: Some(tvl),
            last_apr: Some(apr),
            max_apr: None,
        }
    }

    pub fn max_apr(hash: &str, apr: f64) -> Self {
        Self {
            hash: hash.to_lowercase(),
            tvl: None,
            last_apr: None,
            max_apr: Some(apr),
        }
    }
}
