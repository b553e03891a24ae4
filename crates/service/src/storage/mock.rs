//! In-memory blob store for tests and doc examples.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{key_from_url, new_key, BlobError, BlobStore};

pub const MOCK_BASE_URL: &str = "http://blobs.test/storage";

/// Keeps blobs in a map; puts and deletes can be made to fail on demand.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: Mutex<HashMap<String, Bytes>>,
    fail_put: AtomicBool,
    fail_delete: AtomicBool,
    puts: AtomicUsize,
    deletes: AtomicUsize,
}

impl InMemoryBlobStore {
    pub fn fail_puts(&self, fail: bool) { self.fail_put.store(fail, Ordering::SeqCst); }

    pub fn fail_deletes(&self, fail: bool) { self.fail_delete.store(fail, Ordering::SeqCst); }

    /// Number of `put` calls, failed ones included.
    pub fn put_calls(&self) -> usize { self.puts.load(Ordering::SeqCst) }

    /// Number of `delete` calls, failed ones included.
    pub fn delete_calls(&self) -> usize { self.deletes.load(Ordering::SeqCst) }

    pub fn len(&self) -> usize { self.blobs.lock().unwrap().len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn contains(&self, path: &str) -> bool {
        key_from_url(MOCK_BASE_URL, path)
            .map(|k| self.blobs.lock().unwrap().contains_key(k))
            .unwrap_or(false)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, data: Bytes, extension: &str) -> Result<String, BlobError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(BlobError::Unavailable("put disabled".into()));
        }
        let key = new_key(extension);
        self.blobs.lock().unwrap().insert(key.clone(), data);
        Ok(format!("{}/{}", MOCK_BASE_URL, key))
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(BlobError::Unavailable("delete disabled".into()));
        }
        let key = key_from_url(MOCK_BASE_URL, path)?;
        match self.blobs.lock().unwrap().remove(key) {
            Some(_) => Ok(()),
            None => Err(BlobError::NotFound(path.to_string())),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, BlobError> {
        let key = key_from_url(MOCK_BASE_URL, path)?;
        Ok(self.blobs.lock().unwrap().contains_key(key))
    }
}
