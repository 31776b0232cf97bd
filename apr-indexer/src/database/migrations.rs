//! Embedded schema migrations

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

use crate::core::IndexerResult;

/// Reversible migrations under `apr-indexer/migrations`
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply every pending migration
pub async fn run_migrations(pool: &PgPool) -> IndexerResult<()> {
    MIGRATOR.run(pool).await?;
    info!("Migrations applied");
    Ok(())
}

/// Revert the most recently applied migration; `None` when nothing is applied
pub async fn revert_last(pool: &PgPool) -> IndexerResult<Option<i64>> {
    let applied: Vec<i64> = sqlx::query_scalar(
        "SELECT version FROM _sqlx_migrations WHERE success ORDER BY version DESC LIMIT 2",
    )
    .fetch_all(pool)
    .await?;

    let Some(&latest) = applied.first() else {
        return Ok(None);
    };
    let target = applied.get(1).copied().unwrap_or(0);

    MIGRATOR.undo(pool, target).await?;
    info!(version = latest, "Migration reverted");
    Ok(Some(latest))
}

/// Revert every applied migration
pub async fn revert_all(pool: &PgPool) -> IndexerResult<()> {
    MIGRATOR.undo(pool, 0).await?;
    info!("All migrations reverted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::migrate::MigrationType;

    #[test]
    fn test_migrations_are_reversible_and_ordered() {
        let ups: Vec<i64> = MIGRATOR
            .iter()
            .filter(|m| matches!(m.migration_type, MigrationType::ReversibleUp))
            .map(|m| m.version)
            .collect();
        let downs = MIGRATOR
            .iter()
            .filter(|m| matches!(m.migration_type, MigrationType::ReversibleDown))
            .count();

        assert_eq!(ups.len(), 3);
        assert_eq!(downs, ups.len());
        assert!(ups.windows(2).all(|w| w[0] < w[1]));
    }
}
