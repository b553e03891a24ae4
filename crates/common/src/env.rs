//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the blob storage root exists and is writable.
pub async fn ensure_storage_dir(root: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(root)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {root}: {e}"))?;
    let meta = tokio::fs::metadata(root).await?;
    if meta.permissions().readonly() {
        warn!(%root, "storage directory is read-only; image uploads will fail");
    }
    info!(%root, "storage directory ready");
    Ok(())
}

/// Create the parent directory of a file-backed SQLite database, if any.
pub async fn ensure_sqlite_parent(url: &str) -> anyhow::Result<()> {
    let Some(rest) = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:")) else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.contains(":memory:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_nested_storage_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("a/b/storage");
        ensure_storage_dir(root.to_str().unwrap()).await.unwrap();
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn sqlite_parent_is_created_for_file_urls_only() {
        let tmp = tempfile::tempdir().unwrap();
        let db = tmp.path().join("nested/catalog.db");
        ensure_sqlite_parent(&format!("sqlite://{}?mode=rwc", db.display())).await.unwrap();
        assert!(tmp.path().join("nested").is_dir());

        ensure_sqlite_parent("sqlite::memory:").await.unwrap();
        ensure_sqlite_parent("postgres://localhost/db").await.unwrap();
    }
}
