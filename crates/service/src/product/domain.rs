use bytes::Bytes;
use models::errors::FieldErrors;
use models::product::{self, validate_image, validate_required_text, validate_stock};
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{QueryFilter, Select};
use serde::{Deserialize, Serialize};

/// Persisted product record.
pub type Product = product::Model;

pub const PRODUCT_CREATED: &str = "Product created successfully!";
pub const PRODUCT_EDITED: &str = "Product edited successfully!";
pub const PRODUCT_DELETED: &str = "Product deleted successfully!";

/// Raw create/edit submission as it arrives from a form.
///
/// Every field is optional text so that missing and malformed values are
/// reported through validation rather than rejected by deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub stock: Option<String>,
}

impl ProductForm {
    pub fn new(name: &str, code: &str, variant: &str, manufacturer: &str, stock: i32) -> Self {
        Self {
            name: Some(name.into()),
            code: Some(code.into()),
            variant: Some(variant.into()),
            manufacturer: Some(manufacturer.into()),
            stock: Some(stock.to_string()),
        }
    }
}

/// Uploaded image file.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Field values that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub code: String,
    pub variant: String,
    pub manufacturer: String,
    pub stock: i32,
}

#[derive(Debug, Clone)]
pub struct ValidImage {
    pub data: Bytes,
    pub extension: &'static str,
}

#[derive(Debug, Clone)]
pub struct ValidSubmission {
    pub draft: ProductDraft,
    pub image: Option<ValidImage>,
}

/// Validate a submission; every failing field is reported at once.
pub fn validate(form: &ProductForm, image: Option<ImageUpload>) -> Result<ValidSubmission, FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut text = |field: &'static str, value: &Option<String>| match validate_required_text(field, value.as_deref()) {
        Ok(v) => v,
        Err(e) => {
            errors.record(field, e);
            String::new()
        }
    };
    let name = text("name", &form.name);
    let code = text("code", &form.code);
    let variant = text("variant", &form.variant);
    let manufacturer = text("manufacturer", &form.manufacturer);

    let stock = validate_stock(form.stock.as_deref()).unwrap_or_else(|e| {
        errors.record("stock", e);
        0
    });

    let image = match image {
        Some(upload) => match validate_image(upload.content_type.as_deref(), upload.data.len()) {
            Ok(extension) => Some(ValidImage { data: upload.data, extension }),
            Err(e) => {
                errors.record("image", e);
                None
            }
        },
        None => None,
    };

    errors.into_result(ValidSubmission {
        draft: ProductDraft { name, code, variant, manufacturer, stock },
        image,
    })
}

/// Partial update applied by the repository; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    pub variant: Option<String>,
    pub manufacturer: Option<String>,
    pub stock: Option<i32>,
    pub image_path: Option<Option<String>>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool { *self == Self::default() }

    pub fn with_image_path(mut self, path: Option<String>) -> Self {
        self.image_path = Some(path);
        self
    }

    /// Apply the changes onto an in-memory record.
    pub fn apply_to(self, p: &mut Product) {
        if let Some(v) = self.name {
            p.name_key = product::name_key(&v);
            p.name = v;
        }
        if let Some(v) = self.code { p.code = v; }
        if let Some(v) = self.variant { p.variant = v; }
        if let Some(v) = self.manufacturer { p.manufacturer = v; }
        if let Some(v) = self.stock { p.stock = v; }
        if let Some(v) = self.image_path { p.image_path = v; }
    }
}

impl From<ProductDraft> for ProductChanges {
    fn from(d: ProductDraft) -> Self {
        Self {
            name: Some(d.name),
            code: Some(d.code),
            variant: Some(d.variant),
            manufacturer: Some(d.manufacturer),
            stock: Some(d.stock),
            image_path: None,
        }
    }
}

/// Listing filter: optional case-insensitive substring of the product name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductFilter {
    #[serde(default)]
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn search(term: impl Into<String>) -> Self { Self { search: Some(term.into()) } }

    /// Trimmed search term, `None` when absent or blank.
    pub fn term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Narrow a product query to matching names.
    ///
    /// The term is folded with [`product::name_key`] and matched against the
    /// stored `name_key` column; `%`, `_` and `\` in the term match literally.
    pub fn apply(&self, query: Select<product::Entity>) -> Select<product::Entity> {
        match self.term() {
            Some(term) => {
                let pattern = format!("%{}%", escape_like(&product::name_key(term)));
                query.filter(
                    Expr::col(product::Column::NameKey).like(LikeExpr::new(pattern).escape('\\')),
                )
            }
            None => query,
        }
    }

    /// Same predicate as [`ProductFilter::apply`], for records already in memory.
    pub fn matches(&self, p: &Product) -> bool {
        match self.term() {
            Some(term) => product::name_key(&p.name).contains(&product::name_key(term)),
            None => true,
        }
    }
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Listing order: folded name, then name, then creation time.
pub fn sort_products(items: &mut [Product]) {
    items.sort_by(|a, b| {
        a.name_key
            .cmp(&b.name_key)
            .then_with(|| a.name.cmp(&b.name))
            .then(a.created_at.cmp(&b.created_at))
    });
}

/// A completed mutation and the status line shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct ProductOutcome {
    pub product: Product,
    pub status: &'static str,
}

impl ProductOutcome {
    pub fn new(product: Product, status: &'static str) -> Self { Self { product, status } }
}
