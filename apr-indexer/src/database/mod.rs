//! Persistence layer: Postgres store, in-memory store, and schema migrations

pub mod memory;
pub mod migrations;
pub mod postgres;

pub use memory::MemoryStore;
pub use migrations::{revert_all, revert_last, run_migrations, MIGRATOR};
pub use postgres::PostgresStore;

use tracing::info;

use crate::config::NetworkConfig;
use crate::core::{AprStore, IndexerResult, Network, NewNetwork};

/// Upsert every configured network by title
pub async fn import_networks(store: &dyn AprStore, networks: &[NetworkConfig]) -> IndexerResult<Vec<Network>> {
    let mut imported = Vec::with_capacity(networks.len());
    for network in networks {
        let row = store.upsert_network(&NewNetwork::from(network)).await?;
        info!(title = %row.title, id = row.id, "Imported network");
        imported.push(row);
    }
    Ok(imported)
}
