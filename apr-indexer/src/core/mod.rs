//! Core domain abstractions and types
//!
//! Error definitions, persisted row types, and the storage and upstream
//! ports the rest of the crate is written against.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use error::{IndexerError, IndexerResult, StorageError, UpstreamError};
pub use traits::{AprStore, GraphQLExecutor};
pub use types::{Farming, FarmingUpsert, Network, NewNetwork, Pool, PoolUpsert};
