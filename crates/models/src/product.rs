use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// `name_key(name)`, maintained on every write of `name`.
    #[serde(skip)]
    pub name_key: String,
    pub code: String,
    pub variant: String,
    pub manufacturer: String,
    pub stock: i32,
    pub image_path: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Column width of the text fields in the `product` table.
pub const MAX_TEXT_LEN: usize = 255;

/// Case-folded product name used for search and ordering.
///
/// Folding happens here rather than in SQL because SQLite's `LOWER()` only
/// handles ASCII.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Accepted image content types and the file extension stored for each.
const IMAGE_TYPES: [(&str, &str); 7] = [
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/bmp", "bmp"),
    ("image/svg+xml", "svg"),
    ("image/webp", "webp"),
];

/// Required text field: trimmed, non-empty, within the column width.
pub fn validate_required_text(field: &str, value: Option<&str>) -> Result<String, ModelError> {
    let v = value.map(str::trim).unwrap_or_default();
    if v.is_empty() {
        return Err(ModelError::Validation(format!("The {field} field is required.")));
    }
    if v.chars().count() > MAX_TEXT_LEN {
        return Err(ModelError::Validation(format!(
            "The {field} field must not be greater than {MAX_TEXT_LEN} characters."
        )));
    }
    Ok(v.to_string())
}

/// Stock arrives as form text and must parse as a whole number.
/// Negative values are accepted.
pub fn validate_stock(value: Option<&str>) -> Result<i32, ModelError> {
    let v = value.map(str::trim).unwrap_or_default();
    if v.is_empty() {
        return Err(ModelError::Validation("The stock field is required.".into()));
    }
    v.parse::<i32>()
        .map_err(|_| ModelError::Validation("The stock field must be an integer.".into()))
}

/// File extension for an accepted image content type (parameters like `; charset=` ignored).
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    IMAGE_TYPES.iter().find(|(ct, _)| *ct == essence).map(|(_, ext)| *ext)
}

/// An uploaded image must declare an image content type and carry some bytes.
pub fn validate_image(content_type: Option<&str>, len: usize) -> Result<&'static str, ModelError> {
    let ext = content_type
        .and_then(image_extension)
        .ok_or_else(|| ModelError::Validation("The image field must be an image.".into()))?;
    if len == 0 {
        return Err(ModelError::Validation("The image field must be an image.".into()));
    }
    Ok(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(validate_required_text("name", Some("  Widget ")).unwrap(), "Widget");
    }

    #[test]
    fn required_text_rejects_missing_and_blank() {
        for v in [None, Some(""), Some("   ")] {
            let err = validate_required_text("code", v).unwrap_err();
            assert_eq!(err.to_string(), "validation error: The code field is required.");
        }
    }

    #[test]
    fn required_text_rejects_overlong() {
        let long = "x".repeat(MAX_TEXT_LEN + 1);
        assert!(validate_required_text("variant", Some(&long)).is_err());
        let exact = "x".repeat(MAX_TEXT_LEN);
        assert!(validate_required_text("variant", Some(&exact)).is_ok());
    }

    #[test]
    fn name_key_folds_unicode() {
        assert_eq!(name_key("Éclair ABC"), "éclair abc");
        assert_eq!(name_key("ÅNGSTRÖM"), "ångström");
    }

    #[test]
    fn stock_must_be_integer() {
        assert_eq!(validate_stock(Some("10")).unwrap(), 10);
        assert_eq!(validate_stock(Some(" -3 ")).unwrap(), -3);
        assert!(matches!(validate_stock(Some("1.5")), Err(ModelError::Validation(m)) if m.contains("integer")));
        assert!(matches!(validate_stock(Some("ten")), Err(ModelError::Validation(m)) if m.contains("integer")));
        assert!(matches!(validate_stock(None), Err(ModelError::Validation(m)) if m.contains("required")));
    }

    #[test]
    fn image_content_types() {
        assert_eq!(image_extension("image/png"), Some("png"));
        assert_eq!(image_extension("IMAGE/JPEG; q=1"), Some("jpg"));
        assert_eq!(image_extension("image/svg+xml"), Some("svg"));
        assert_eq!(image_extension("application/pdf"), None);
        assert_eq!(image_extension("image/tiff"), None);
    }

    #[test]
    fn image_needs_type_and_bytes() {
        assert_eq!(validate_image(Some("image/webp"), 12).unwrap(), "webp");
        assert!(validate_image(None, 12).is_err());
        assert!(validate_image(Some("text/plain"), 12).is_err());
        assert!(validate_image(Some("image/png"), 0).is_err());
    }
}
