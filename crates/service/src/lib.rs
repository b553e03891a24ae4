//! Service layer providing the product catalog business operations.
//! - Separates business logic from data access and blob storage.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
pub mod storage;
pub mod db;
pub mod product;
