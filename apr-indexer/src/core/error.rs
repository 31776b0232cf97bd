//! Centralized error types for the APR indexer

use thiserror::Error;

/// Main indexer error type
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network not found: {0}")]
    NetworkNotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Errors talking to an upstream indexing endpoint
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("GraphQL errors: {0}")]
    GraphQL(String),
}

/// Result type alias for indexer operations
pub type IndexerResult<T> = Result<T, IndexerError>;

/// Helper to convert sqlx errors
impl From<sqlx::Error> for IndexerError {
    fn from(err: sqlx::Error) -> Self {
        IndexerError::Storage(StorageError::Database(err.to_string()))
    }
}

impl From<sqlx::migrate::MigrateError> for IndexerError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        IndexerError::Storage(StorageError::MigrationFailed(err.to_string()))
    }
}

impl From<reqwest::Error> for IndexerError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        IndexerError::Upstream(UpstreamError::Transport {
            url,
            reason: err.to_string(),
        })
    }
}

impl From<serde_json::Error> for IndexerError {
    fn from(err: serde_json::Error) -> Self {
        IndexerError::Decode(err.to_string())
    }
}

impl From<config::ConfigError> for IndexerError {
    fn from(err: config::ConfigError) -> Self {
        IndexerError::Configuration(err.to_string())
    }
}

impl From<validator::ValidationErrors> for IndexerError {
    fn from(err: validator::ValidationErrors) -> Self {
        IndexerError::Configuration(err.to_string())
    }
}

impl IndexerError {
    /// Whether the failure came from an upstream endpoint or its payload
    pub fn is_upstream(&self) -> bool {
        matches!(self, IndexerError::Upstream(_) | IndexerError::Decode(_))
    }
}
