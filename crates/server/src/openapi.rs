use chrono::{DateTime, FixedOffset};
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ProductDoc {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub variant: String,
    pub manufacturer: String,
    pub stock: i32,
    /// Public URL of the stored image
    pub image_path: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

#[derive(ToSchema)]
pub struct ProductFilterDoc { pub search: Option<String> }

#[derive(ToSchema)]
pub struct ProductIndexDoc {
    pub products: Vec<ProductDoc>,
    pub filters: ProductFilterDoc,
    pub status: Option<String>,
}

/// Create/edit form. `stock` is sent as text and must be an integer.
#[derive(ToSchema)]
pub struct ProductFormDoc {
    pub name: String,
    pub code: String,
    pub variant: String,
    pub manufacturer: String,
    pub stock: String,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

#[derive(ToSchema)]
pub struct ProductOutcomeDoc {
    pub product: ProductDoc,
    pub status: String,
}

#[derive(ToSchema)]
pub struct ValidationErrorDoc {
    pub message: String,
    /// Field name to messages
    pub errors: std::collections::BTreeMap<String, Vec<String>>,
}

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub error: String,
    pub detail: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::products::index,
        crate::routes::products::show,
        crate::routes::products::store,
        crate::routes::products::update,
        crate::routes::products::destroy,
    ),
    components(
        schemas(
            HealthResponse,
            ProductDoc,
            ProductFilterDoc,
            ProductIndexDoc,
            ProductFormDoc,
            ProductOutcomeDoc,
            ValidationErrorDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "products")
    )
)]
pub struct ApiDoc;
