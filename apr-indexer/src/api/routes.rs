//! API route definitions

use super::{handlers::*, ApiState};
use axum::{routing::get, Router};

/// Pool metric routes
pub fn create_pool_routes() -> Router<ApiState> {
    Router::new()
        .route("/api/pools/apr", get(get_pools_apr))
        .route("/api/pools/max-apr", get(get_pools_max_apr))
}

/// Eternal farming metric routes
pub fn create_farming_routes() -> Router<ApiState> {
    Router::new()
        .route("/api/eternal-farmings/apr", get(get_farmings_apr))
        .route("/api/eternal-farmings/max-apr", get(get_farmings_max_apr))
        .route("/api/eternal-farmings/tvl", get(get_farmings_tvl))
}
