//! SeaORM data access functions used by the repository implementations.

pub mod product_service;
