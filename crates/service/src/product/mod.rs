//! Product catalog: domain types, repository and service.
//!
//! The service owns validation and the image lifecycle; the repository only
//! persists records.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{ImageUpload, Product, ProductFilter, ProductForm, ProductOutcome};
pub use repository::{ProductRepository, SeaOrmProductRepository};
pub use service::ProductService;
