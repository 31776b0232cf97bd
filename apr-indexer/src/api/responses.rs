//! API response types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::{Farming, Pool};

/// Address or hash to metric value, keys sorted
pub type MetricMap = BTreeMap<String, f64>;

pub fn pool_metric(pools: &[Pool], metric: impl Fn(&Pool) -> Option<f64>) -> MetricMap {
    pools
        .iter()
        .map(|pool| (pool.address.clone(), metric(pool).unwrap_or(0.0)))
        .collect()
}

pub fn farming_metric(farmings: &[Farming], metric: impl Fn(&Farming) -> Option<f64>) -> MetricMap {
    farmings
        .iter()
        .map(|farming| (farming.hash.clone(), metric(farming).unwrap_or(0.0)))
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Store failure surfaced to the client as 500
#[derive(Debug)]
pub struct ApiError(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: self.0 }),
        )
            .into_response()
    }
}
