//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

/// Ensure the blob storage root and any SQLite parent directory exist.
pub async fn ensure_env(storage_root: &str, database_url: &str) -> anyhow::Result<()> {
    common::env::ensure_storage_dir(storage_root).await?;
    common::env::ensure_sqlite_parent(database_url).await
}
