//! Full cycle against stub GraphQL indexers served over HTTP

use apr_indexer::api::{create_router, ApiState};
use apr_indexer::core::{AprStore, GraphQLExecutor, IndexerError, NewNetwork, UpstreamError};
use apr_indexer::database::MemoryStore;
use apr_indexer::graphql::{build_http_client, queries, GraphQLClient};
use apr_indexer::scheduler::Scheduler;
use apr_indexer::services::snapshot::{yesterday_start, SnapshotFetcher};
use apr_indexer::services::AprService;
use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

const POOL_ID: &str = "0xpool";
const FARMING_ID: &str = "0xfarming";
const REWARD_TOKEN: &str = "0xreward";

fn token(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "symbol": name, "decimals": "18", "derivedMatic": "1" })
}

fn pool() -> Value {
    json!({
        "id": POOL_ID,
        "tick": "0",
        "token0Price": "1",
        "liquidity": "1000000000000000000",
        "token0": token("0xt0", "Alpha"),
        "token1": token("0xt1", "Beta"),
    })
}

/// What the analytics stub saw
#[derive(Clone, Default)]
struct Recorded {
    api_keys: Arc<Mutex<Vec<Option<String>>>>,
    day_dates: Arc<Mutex<Vec<Value>>>,
}

async fn analytics(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Json<Value> {
    let api_key = headers
        .get("api-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    recorded.api_keys.lock().unwrap().push(api_key);

    let query = request["query"].as_str().unwrap_or_default();
    if query.contains("poolDayDatas(") {
        recorded
            .day_dates
            .lock()
            .unwrap()
            .push(request["variables"]["date"].clone());
    }
    let data = if query.contains("poolDayDatas(") {
        json!({ "poolDayDatas": [{
            "id": "0xpool-19000",
            "date": request["variables"]["date"],
            "feesToken0": "10",
            "feesToken1": "0",
            "pool": { "id": POOL_ID },
        }] })
    } else if query.contains("positions(") {
        json!({ "positions": [{
            "id": "1",
            "owner": "0xowner",
            "liquidity": "1000000000000000000",
            "tickLower": { "tickIdx": "-600" },
            "tickUpper": { "tickIdx": "600" },
            "pool": pool(),
        }] })
    } else if query.contains("pools(") {
        json!({ "pools": [pool()] })
    } else if query.contains("tokens(") {
        json!({ "tokens": [token(REWARD_TOKEN, "Reward")] })
    } else {
        Value::Null
    };
    Json(json!({ "data": data }))
}

async fn farming(Json(request): Json<Value>) -> Json<Value> {
    let query = request["query"].as_str().unwrap_or_default();
    let data = if query.contains("eternalFarmings(") {
        json!({ "eternalFarmings": [{
            "id": FARMING_ID,
            "pool": POOL_ID,
            "rewardToken": REWARD_TOKEN,
            "bonusRewardToken": "0x0000000000000000000000000000000000000000",
            "rewardRate": "1000000000000000000",
            "bonusRewardRate": "0",
        }] })
    } else if query.contains("deposits(") {
        json!({ "deposits": [{ "id": "1", "eternalFarming": FARMING_ID }] })
    } else {
        Value::Null
    };
    Json(json!({ "data": data }))
}

async fn failing(Json(_): Json<Value>) -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "indexer unavailable")
}

/// HTTP 200 carrying a GraphQL error list that echoes the `api-key` header
async fn graphql_errors(headers: HeaderMap, Json(_): Json<Value>) -> Json<Value> {
    let key = headers
        .get("api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("none");
    Json(json!({
        "data": null,
        "errors": [
            { "message": format!("rejected key={key}"), "path": ["pools", 0] },
            { "message": "rate limited" },
        ],
    }))
}

async fn spawn_upstream_recording() -> (SocketAddr, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/analytics", post(analytics))
        .route("/farming", post(farming))
        .route("/broken", post(failing))
        .route("/errors", post(graphql_errors))
        .with_state(recorded.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, recorded)
}

async fn spawn_upstream() -> SocketAddr {
    spawn_upstream_recording().await.0
}

async fn get_json(app: Router, uri: &str) -> Value {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_cycle_persists_and_serves_metrics() {
    let addr = spawn_upstream().await;
    let store = Arc::new(MemoryStore::new());
    let network = store
        .upsert_network(&NewNetwork {
            title: "Stubnet".to_string(),
            analytics_subgraph_url: format!("http://{addr}/analytics"),
            farming_subgraph_url: format!("http://{addr}/farming"),
            api_key: Some("key".to_string()),
        })
        .await
        .unwrap();

    let http = build_http_client(Duration::from_secs(5)).unwrap();
    let service = AprService::new(store.clone(), http);
    let report = service.update_network(&network).await.unwrap();
    assert_eq!(report.pools, 1);
    assert_eq!(report.farmings, 1);
    assert_eq!(report.failed_writes, 0);

    let app = create_router(ApiState::new(store), &["*".to_string()]);

    let pools = get_json(app.clone(), "/api/pools/apr?network=Stubnet").await;
    let apr = pools[POOL_ID].as_f64().unwrap();
    assert!(apr > 0.0 && apr.is_finite());

    let max = get_json(app.clone(), "/api/pools/max-apr?network=Stubnet").await;
    // A single position holding all liquidity earns the whole pool yield
    assert!((max[POOL_ID].as_f64().unwrap() - apr).abs() <= apr * 1e-9);

    let tvl = get_json(app.clone(), "/api/eternal-farmings/tvl?network=Stubnet").await;
    assert!(tvl[FARMING_ID].as_f64().unwrap() > 0.0);

    let farming_apr = get_json(app, "/api/eternal-farmings/apr?network=Stubnet").await;
    assert!(farming_apr[FARMING_ID].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_api_key_header_sent_on_every_request() {
    let (addr, recorded) = spawn_upstream_recording().await;
    let store = Arc::new(MemoryStore::new());
    let network = store
        .upsert_network(&NewNetwork {
            title: "Keyed".to_string(),
            analytics_subgraph_url: format!("http://{addr}/analytics"),
            farming_subgraph_url: format!("http://{addr}/farming"),
            api_key: Some("k1".to_string()),
        })
        .await
        .unwrap();

    let service = AprService::new(store, build_http_client(Duration::from_secs(5)).unwrap());
    service.update_network(&network).await.unwrap();

    let keys = recorded.api_keys.lock().unwrap();
    // pools, day datas, positions, tokens
    assert_eq!(keys.len(), 4);
    assert!(keys.iter().all(|key| key.as_deref() == Some("k1")));
}

#[tokio::test]
async fn test_no_api_key_header_without_key() {
    let (addr, recorded) = spawn_upstream_recording().await;
    let client = GraphQLClient::new(
        build_http_client(Duration::from_secs(5)).unwrap(),
        format!("http://{addr}/analytics"),
        Some(String::new()),
    );

    client
        .execute(queries::POOLS, json!({ "first": 1000, "id_gt": "0" }))
        .await
        .unwrap();

    assert_eq!(*recorded.api_keys.lock().unwrap(), vec![None]);
}

#[tokio::test]
async fn test_graphql_error_list_fails_the_request() {
    let (addr, _) = spawn_upstream_recording().await;
    let client = GraphQLClient::new(
        build_http_client(Duration::from_secs(5)).unwrap(),
        format!("http://{addr}/errors"),
        Some("k1".to_string()),
    );

    let err = client
        .execute(queries::POOLS, json!({ "first": 1000, "id_gt": "0" }))
        .await
        .unwrap_err();

    assert!(err.is_upstream());
    match err {
        IndexerError::Upstream(UpstreamError::GraphQL(message)) => {
            assert_eq!(message, "rejected key=k1 (path: pools.0); rate limited");
        }
        other => panic!("expected a GraphQL error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_day_data_requested_for_yesterday_midnight() {
    let (addr, recorded) = spawn_upstream_recording().await;
    let http = build_http_client(Duration::from_secs(5)).unwrap();
    let analytics = GraphQLClient::new(http.clone(), format!("http://{addr}/analytics"), None);
    let farming = GraphQLClient::new(http, format!("http://{addr}/farming"), None);

    let now = Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap();
    SnapshotFetcher::new(&analytics, &farming)
        .fetch(now)
        .await
        .unwrap();

    assert_eq!(yesterday_start(now), 1_709_942_400);
    assert_eq!(*recorded.day_dates.lock().unwrap(), vec![json!(1_709_942_400)]);
}

#[tokio::test]
async fn test_failing_network_does_not_block_others() {
    let addr = spawn_upstream().await;
    let store = Arc::new(MemoryStore::new());
    for (title, analytics_path) in [("Healthy", "analytics"), ("Broken", "broken")] {
        store
            .upsert_network(&NewNetwork {
                title: title.to_string(),
                analytics_subgraph_url: format!("http://{addr}/{analytics_path}"),
                farming_subgraph_url: format!("http://{addr}/farming"),
                api_key: None,
            })
            .await
            .unwrap();
    }

    let http = build_http_client(Duration::from_secs(5)).unwrap();
    let service = Arc::new(AprService::new(store.clone(), http));
    let scheduler = Scheduler::new(store.clone(), service, Duration::from_secs(60), 2);

    let summary = scheduler.run_cycle().await;
    assert_eq!(summary.networks, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);

    assert_eq!(store.list_pools_by_network_name("Healthy").await.unwrap().len(), 1);
    assert!(store.list_pools_by_network_name("Broken").await.unwrap().is_empty());
}
