use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::{BlobError, BlobStore};
use super::domain::{
    validate, ImageUpload, Product, ProductChanges, ProductFilter, ProductForm, ProductOutcome, ValidImage,
    PRODUCT_CREATED, PRODUCT_DELETED, PRODUCT_EDITED,
};
use super::repository::ProductRepository;

/// Product business service independent of web framework.
///
/// Coordinates record writes with the image blob lifecycle. The two stores
/// are not updated atomically; the order of steps below keeps a record from
/// pointing at a missing blob, at the cost of a possible orphan blob when the
/// process dies between steps.
pub struct ProductService<R: ProductRepository, B: BlobStore> {
    repo: Arc<R>,
    blobs: Arc<B>,
}

impl<R: ProductRepository, B: BlobStore> ProductService<R, B> {
    pub fn new(repo: Arc<R>, blobs: Arc<B>) -> Self { Self { repo, blobs } }

    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ServiceError> {
        self.repo.list(filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Product, ServiceError> {
        self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("product"))
    }

    /// Validate and create a product, storing its image first when one is given.
    ///
    /// # Examples
    /// ```
    /// use service::product::{ProductService, ProductForm};
    /// use service::product::repository::mock::InMemoryProductRepository;
    /// use service::storage::mock::InMemoryBlobStore;
    /// use std::sync::Arc;
    /// let svc = ProductService::new(Arc::new(InMemoryProductRepository::default()), Arc::new(InMemoryBlobStore::default()));
    /// let form = ProductForm::new("Widget", "W1", "red", "Acme", 10);
    /// let out = tokio_test::block_on(svc.create(form, None)).unwrap();
    /// assert_eq!(out.product.name, "Widget");
    /// assert_eq!(out.status, "Product created successfully!");
    /// ```
    #[instrument(skip(self, form, image), fields(has_image = image.is_some()))]
    pub async fn create(&self, form: ProductForm, image: Option<ImageUpload>) -> Result<ProductOutcome, ServiceError> {
        let valid = validate(&form, image)?;

        let image_path = match valid.image {
            Some(img) => Some(self.store_image(img).await?),
            None => None,
        };

        match self.repo.create(&valid.draft, image_path.as_deref()).await {
            Ok(product) => {
                info!(id = %product.id, name = %product.name, "product_created");
                Ok(ProductOutcome::new(product, PRODUCT_CREATED))
            }
            Err(e) => {
                error!(err = %e, "create product failed");
                if let Some(path) = image_path {
                    self.discard_blob(&path, "create_failed").await;
                }
                Err(e)
            }
        }
    }

    /// Validate and update a product.
    ///
    /// A new image is stored before the record is touched; the previous blob
    /// is removed only after the record points at the new one. Without an
    /// image the stored `image_path` is kept.
    #[instrument(skip(self, form, image), fields(id = %id, has_image = image.is_some()))]
    pub async fn update(&self, id: Uuid, form: ProductForm, image: Option<ImageUpload>) -> Result<ProductOutcome, ServiceError> {
        let valid = validate(&form, image)?;
        let existing = self.get(id).await?;

        let new_path = match valid.image {
            Some(img) => Some(self.store_image(img).await?),
            None => None,
        };

        let mut changes = ProductChanges::from(valid.draft);
        if let Some(path) = &new_path {
            changes = changes.with_image_path(Some(path.clone()));
        }

        let product = match self.repo.update(id, changes).await {
            Ok(p) => p,
            Err(e) => {
                error!(err = %e, "update product failed");
                if let Some(path) = new_path {
                    self.discard_blob(&path, "update_failed").await;
                }
                return Err(e);
            }
        };

        if new_path.is_some() {
            if let Some(old) = existing.image_path.as_deref() {
                self.discard_blob(old, "image_replaced").await;
            }
        }

        info!(id = %product.id, image_replaced = new_path.is_some(), "product_updated");
        Ok(ProductOutcome::new(product, PRODUCT_EDITED))
    }

    /// Delete a product, then its image. Image cleanup failures are logged only.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<ProductOutcome, ServiceError> {
        let existing = self.get(id).await?;
        self.repo.delete(id).await?;

        if let Some(path) = existing.image_path.as_deref() {
            self.discard_blob(path, "product_deleted").await;
        }

        info!(id = %id, "product_deleted");
        Ok(ProductOutcome::new(existing, PRODUCT_DELETED))
    }

    async fn store_image(&self, img: ValidImage) -> Result<String, ServiceError> {
        let size = img.data.len();
        match self.blobs.put(img.data, img.extension).await {
            Ok(path) => {
                debug!(%path, size, "image_stored");
                Ok(path)
            }
            Err(e) => {
                error!(err = %e, size, "image store failed");
                Err(ServiceError::Storage(e))
            }
        }
    }

    /// Best-effort blob removal.
    async fn discard_blob(&self, path: &str, reason: &'static str) {
        match self.blobs.delete(path).await {
            Ok(()) => debug!(%path, reason, "image_deleted"),
            Err(BlobError::NotFound(_)) => warn!(%path, reason, "image already missing"),
            Err(e) => warn!(%path, reason, err = %e, "image cleanup failed; blob left orphaned"),
        }
    }
}
