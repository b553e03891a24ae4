use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::product::{ProductService, SeaOrmProductRepository};
use service::storage::LocalBlobStore;

/// Product service wired to the database and the local image directory.
pub type CatalogService = ProductService<SeaOrmProductRepository, LocalBlobStore>;

#[derive(Clone)]
pub struct ServerState {
    pub products: Arc<CatalogService>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, blobs: LocalBlobStore) -> Self {
        let repo = Arc::new(SeaOrmProductRepository { db });
        let products = Arc::new(ProductService::new(repo, Arc::new(blobs)));
        Self { products }
    }
}
