//! Read-only REST API over the persisted APR metrics

mod handlers;
mod responses;
mod routes;

pub use handlers::{NetworkQuery, DEFAULT_NETWORK};
pub use responses::{ErrorResponse, HealthResponse, MetricMap};
pub use routes::*;

use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::core::AprStore;

const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// Shared API state
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn AprStore>,
}

impl ApiState {
    pub fn new(store: Arc<dyn AprStore>) -> Self {
        Self { store }
    }
}

/// Build the application router with tracing and CORS layers
pub fn create_router(state: ApiState, cors_origins: &[String]) -> Router {
    Router::new()
        .merge(create_pool_routes())
        .merge(create_farming_routes())
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origins)),
        )
}

/// `["*"]` (or an empty list) allows any origin; otherwise only the listed ones
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .max_age(CORS_MAX_AGE)
}
