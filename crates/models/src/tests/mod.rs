

use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

/// Fresh in-memory SQLite database with all migrations applied.
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let db = crate::db::connect_with_config(&memory_config()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub(crate) fn memory_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        min_connections: 1,
        connect_timeout_secs: 5,
        idle_timeout_secs: 600,
        max_lifetime_secs: 3600,
        acquire_timeout_secs: 5,
        sqlx_logging: false,
    }
}
