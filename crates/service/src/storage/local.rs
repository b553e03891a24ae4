use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use super::{key_from_url, new_key, BlobError, BlobStore};

/// Filesystem-backed blob store.
///
/// Files live under `root/<key>`; the server exposes `root` at
/// `public_base_url`, so the URL returned by `put` is directly fetchable.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new<P: Into<PathBuf>>(root: P, public_base_url: &str) -> Self {
        Self { root: root.into(), public_base_url: public_base_url.trim_end_matches('/').to_string() }
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn public_base_url(&self) -> &str { &self.public_base_url }

    fn file_for(&self, path: &str) -> Result<PathBuf, BlobError> {
        let key = key_from_url(&self.public_base_url, path)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, data: Bytes, extension: &str) -> Result<String, BlobError> {
        let key = new_key(extension);
        let target = self.root.join(&key);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        // write under a temp name then rename, so readers never see a partial file
        let tmp = target.with_extension("part");
        fs::write(&tmp, &data).await?;
        if let Err(e) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        let url = format!("{}/{}", self.public_base_url, key);
        debug!(%url, bytes = data.len(), "blob_stored");
        Ok(url)
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        let file = self.file_for(path)?;
        match fs::remove_file(&file).await {
            Ok(()) => {
                debug!(%path, "blob_deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BlobError::NotFound(path.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, BlobError> {
        let file = self.file_for(path)?;
        Ok(fs::try_exists(&file).await?)
    }
}
