//! Blob storage for uploaded product images.
//!
//! A [`BlobStore`] persists raw bytes under generated keys in the
//! [`IMAGE_NAMESPACE`] namespace and hands back a fully-qualified URL that is
//! stored on the product record. The same URL is later used to delete it.

pub mod local;
pub mod mock;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

pub use local::LocalBlobStore;

/// Namespace (first path segment) of every product image key.
pub const IMAGE_NAMESPACE: &str = "product-images";

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("path is not managed by this store: {0}")]
    InvalidPath(String),
    #[error("blob backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under a fresh key and return its resolvable URL.
    async fn put(&self, data: Bytes, extension: &str) -> Result<String, BlobError>;
    /// Remove the blob behind a URL previously returned by `put`.
    async fn delete(&self, path: &str) -> Result<(), BlobError>;
    async fn exists(&self, path: &str) -> Result<bool, BlobError>;
}

/// Generate a new key `product-images/<uuid>.<ext>`.
pub fn new_key(extension: &str) -> String {
    let ext = extension.trim_start_matches('.');
    format!("{}/{}.{}", IMAGE_NAMESPACE, Uuid::new_v4(), ext)
}

/// Map a public URL back onto its key under `base_url`.
///
/// Only single-segment names inside [`IMAGE_NAMESPACE`] are accepted so a
/// crafted path can never escape the storage root.
pub fn key_from_url<'a>(base_url: &str, path: &'a str) -> Result<&'a str, BlobError> {
    let invalid = || BlobError::InvalidPath(path.to_string());
    let key = path
        .strip_prefix(base_url.trim_end_matches('/'))
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(invalid)?;
    let name = key
        .strip_prefix(IMAGE_NAMESPACE)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(invalid)?;
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(invalid());
    }
    Ok(key)
}
