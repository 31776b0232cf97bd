//! APR indexer service
//!
//! Imports the configured networks, then runs the periodic APR updater next
//! to the read API until interrupted.

use anyhow::{Context, Result};
use apr_indexer::api::{create_router, ApiState};
use apr_indexer::core::AprStore;
use apr_indexer::database::{import_networks, PostgresStore};
use apr_indexer::graphql::build_http_client;
use apr_indexer::shutdown::serve_until;
use apr_indexer::{init_logging, AppConfig, AprService, Scheduler};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "apr-indexer")]
#[command(about = "APR aggregator for concentrated-liquidity pools and eternal farmings")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Override log level
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }
    init_logging(&config)?;

    info!("Starting APR indexer");
    info!(
        networks = config.networks.len(),
        update_minutes = config.apr_update_minutes,
        "Configuration loaded"
    );

    let store = PostgresStore::connect(
        config.database.connect_options()?,
        config.database.max_connections,
    )
    .await
    .context("Failed to connect to database")?;
    let store: Arc<dyn AprStore> = Arc::new(store);

    import_networks(store.as_ref(), &config.networks)
        .await
        .context("Failed to import networks")?;

    let http = build_http_client(config.upstream_timeout())?;
    let service = Arc::new(AprService::new(store.clone(), http));
    let scheduler = Scheduler::new(
        store.clone(),
        service,
        config.update_interval(),
        config.max_parallel_networks,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    let app = create_router(ApiState::new(store), &config.cors_origins);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port()));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server starting on {}", addr);

    let report = serve_until(
        listener,
        app,
        shutdown_tx,
        scheduler_handle,
        shutdown_signal(),
        config.shutdown_timeout(),
    )
    .await?;

    info!(
        scheduler = ?report.scheduler,
        drained = report.drained,
        "Server exited"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Received shutdown signal");
}
