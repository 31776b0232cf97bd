//! APR indexer library
//!
//! Pulls pool, position and eternal farming snapshots from the analytics and
//! farming GraphQL indexers of each configured network, derives current and
//! maximum APR figures, persists them in PostgreSQL and serves them over a
//! small read-only HTTP API.

pub mod api;
pub mod config;
pub mod core;
pub mod database;
pub mod graphql;
pub mod models;
pub mod scheduler;
pub mod services;
pub mod shutdown;

pub use config::AppConfig;
pub use core::{AprStore, IndexerError, IndexerResult};
pub use scheduler::Scheduler;
pub use services::AprService;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber; `RUST_LOG` takes precedence over `log_level`
pub fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    let log_level = config
        .log_level
        .parse()
        .unwrap_or(tracing::Level::INFO);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "apr_indexer={lvl},apr_migrate={lvl},tower_http=info",
            lvl = log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    Ok(())
}
