//! API request handlers

use super::{responses::*, ApiState};
use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::{request::Parts, StatusCode},
    response::Json,
};
use std::convert::Infallible;

use crate::core::{Farming, Pool};

pub const DEFAULT_NETWORK: &str = "Polygon";

/// `network` query parameter
///
/// Absent means the default network; a repeated key takes the first value.
/// An unparsable query string names no network, so the reply is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkQuery {
    pub network: String,
}

impl NetworkQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let network = pairs
            .iter()
            .find(|(key, _)| key == "network")
            .map(|(_, value)| value.clone())
            .unwrap_or_else(|| DEFAULT_NETWORK.to_string());
        Self { network }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for NetworkQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(match Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
            Ok(Query(pairs)) => Self::from_pairs(&pairs),
            Err(e) => {
                tracing::debug!(error = %e, "Unparsable query string");
                Self {
                    network: String::new(),
                }
            }
        })
    }
}

async fn load_pools(state: &ApiState, network: &str) -> Result<Vec<Pool>, ApiError> {
    state.store.list_pools_by_network_name(network).await.map_err(|e| {
        tracing::error!(network, error = %e, "Failed to fetch pools");
        ApiError("Failed to fetch pools".to_string())
    })
}

async fn load_farmings(state: &ApiState, network: &str) -> Result<Vec<Farming>, ApiError> {
    state.store.list_farmings_by_network_name(network).await.map_err(|e| {
        tracing::error!(network, error = %e, "Failed to fetch eternal farmings");
        ApiError("Failed to fetch eternal farmings".to_string())
    })
}

/// GET /api/pools/apr
pub async fn get_pools_apr(
    State(state): State<ApiState>,
    query: NetworkQuery,
) -> Result<Json<MetricMap>, ApiError> {
    let pools = load_pools(&state, &query.network).await?;
    Ok(Json(pool_metric(&pools, |p| p.last_apr)))
}

/// GET /api/pools/max-apr
pub async fn get_pools_max_apr(
    State(state): State<ApiState>,
    query: NetworkQuery,
) -> Result<Json<MetricMap>, ApiError> {
    let pools = load_pools(&state, &query.network).await?;
    Ok(Json(pool_metric(&pools, |p| p.max_apr)))
}

/// GET /api/eternal-farmings/apr
pub async fn get_farmings_apr(
    State(state): State<ApiState>,
    query: NetworkQuery,
) -> Result<Json<MetricMap>, ApiError> {
    let farmings = load_farmings(&state, &query.network).await?;
    Ok(Json(farming_metric(&farmings, |f| f.last_apr)))
}

/// GET /api/eternal-farmings/max-apr
pub async fn get_farmings_max_apr(
    State(state): State<ApiState>,
    query: NetworkQuery,
) -> Result<Json<MetricMap>, ApiError> {
    let farmings = load_farmings(&state, &query.network).await?;
    Ok(Json(farming_metric(&farmings, |f| f.max_apr)))
}

/// GET /api/eternal-farmings/tvl
pub async fn get_farmings_tvl(
    State(state): State<ApiState>,
    query: NetworkQuery,
) -> Result<Json<MetricMap>, ApiError> {
    let farmings = load_farmings(&state, &query.network).await?;
    Ok(Json(farming_metric(&farmings, |f| f.tvl)))
}

/// GET /health
pub async fn health(State(state): State<ApiState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status) = match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            service: "apr-indexer".to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        }),
    )
}
