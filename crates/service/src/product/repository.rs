use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::errors::ServiceError;
use super::domain::{Product, ProductChanges, ProductDraft, ProductFilter};

/// Persistence boundary for product records.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<Product>, ServiceError>;
    async fn create(&self, draft: &ProductDraft, image_path: Option<&str>) -> Result<Product, ServiceError>;
    /// Fails with `NotFound` when `id` does not exist.
    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Product, ServiceError>;
    /// Fails with `NotFound` when `id` does not exist.
    async fn delete(&self, id: Uuid) -> Result<(), ServiceError>;
}

/// SeaORM-backed repository implementation.
#[derive(Clone)]
pub struct SeaOrmProductRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ServiceError> {
        crate::db::product_service::list_products(&self.db, filter).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Product>, ServiceError> {
        crate::db::product_service::get_product(&self.db, id).await
    }

    async fn create(&self, draft: &ProductDraft, image_path: Option<&str>) -> Result<Product, ServiceError> {
        crate::db::product_service::create_product(&self.db, draft, image_path).await
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Product, ServiceError> {
        crate::db::product_service::update_product(&self.db, id, changes).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        crate::db::product_service::delete_product(&self.db, id).await
    }
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use crate::product::domain::sort_products;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryProductRepository {
        products: Mutex<HashMap<Uuid, Product>>,
        fail_writes: AtomicBool,
    }

    impl InMemoryProductRepository {
        /// Make create/update/delete fail with a database error.
        pub fn fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst); }

        pub fn len(&self) -> usize { self.products.lock().unwrap().len() }

        pub fn is_empty(&self) -> bool { self.len() == 0 }

        fn check_writable(&self) -> Result<(), ServiceError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ServiceError::Db("writes disabled".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ProductRepository for InMemoryProductRepository {
        async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ServiceError> {
            let products = self.products.lock().unwrap();
            let mut out: Vec<Product> = products.values().filter(|p| filter.matches(p)).cloned().collect();
            sort_products(&mut out);
            Ok(out)
        }

        async fn get(&self, id: Uuid) -> Result<Option<Product>, ServiceError> {
            Ok(self.products.lock().unwrap().get(&id).cloned())
        }

        async fn create(&self, draft: &ProductDraft, image_path: Option<&str>) -> Result<Product, ServiceError> {
            self.check_writable()?;
            let now = Utc::now().into();
            let p = Product {
                id: Uuid::new_v4(),
                name: draft.name.clone(),
                name_key: models::product::name_key(&draft.name),
                code: draft.code.clone(),
                variant: draft.variant.clone(),
                manufacturer: draft.manufacturer.clone(),
                stock: draft.stock,
                image_path: image_path.map(str::to_string),
                created_at: now,
                updated_at: now,
            };
            self.products.lock().unwrap().insert(p.id, p.clone());
            Ok(p)
        }

        async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Product, ServiceError> {
            self.check_writable()?;
            let mut products = self.products.lock().unwrap();
            let p = products.get_mut(&id).ok_or_else(|| ServiceError::not_found("product"))?;
            changes.apply_to(p);
            p.updated_at = Utc::now().into();
            Ok(p.clone())
        }

        async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
            self.check_writable()?;
            match self.products.lock().unwrap().remove(&id) {
                Some(_) => Ok(()),
                None => Err(ServiceError::not_found("product")),
            }
        }
    }
}
