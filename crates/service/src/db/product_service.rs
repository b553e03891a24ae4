use uuid::Uuid;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use chrono::Utc;
use models::product;
use crate::errors::ServiceError;
use crate::product::domain::{ProductChanges, ProductDraft, ProductFilter};

/// List products matching the filter, ordered by folded name, then name, then creation time.
pub async fn list_products(db: &DatabaseConnection, filter: &ProductFilter) -> Result<Vec<product::Model>, ServiceError> {
    let rows = filter
        .apply(product::Entity::find())
        .order_by_asc(product::Column::NameKey)
        .order_by_asc(product::Column::Name)
        .order_by_asc(product::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows)
}

/// Get product by id.
pub async fn get_product(db: &DatabaseConnection, id: Uuid) -> Result<Option<product::Model>, ServiceError> {
    Ok(product::Entity::find_by_id(id).one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?)
}

/// Create a product from validated fields.
pub async fn create_product(db: &DatabaseConnection, draft: &ProductDraft, image_path: Option<&str>) -> Result<product::Model, ServiceError> {
    let now = Utc::now().into();
    let am = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(draft.name.clone()),
        name_key: Set(product::name_key(&draft.name)),
        code: Set(draft.code.clone()),
        variant: Set(draft.variant.clone()),
        manufacturer: Set(draft.manufacturer.clone()),
        stock: Set(draft.stock),
        image_path: Set(image_path.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await.map_err(|e| ServiceError::Db(e.to_string()))?)
}

/// Merge changes into an existing product.
pub async fn update_product(db: &DatabaseConnection, id: Uuid, changes: ProductChanges) -> Result<product::Model, ServiceError> {
    let mut am: product::ActiveModel = product::Entity::find_by_id(id)
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("product"))?
        .into();
    if let Some(v) = changes.name {
        am.name_key = Set(product::name_key(&v));
        am.name = Set(v);
    }
    if let Some(v) = changes.code { am.code = Set(v); }
    if let Some(v) = changes.variant { am.variant = Set(v); }
    if let Some(v) = changes.manufacturer { am.manufacturer = Set(v); }
    if let Some(v) = changes.stock { am.stock = Set(v); }
    if let Some(v) = changes.image_path { am.image_path = Set(v); }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?)
}

/// Hard-delete a product.
pub async fn delete_product(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = product::Entity::delete_by_id(id).exec(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("product"));
    }
    Ok(())
}
