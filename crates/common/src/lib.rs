//! Shared building blocks for the workspace crates: logging setup,
//! startup environment checks and small response types.

pub mod types;
pub mod utils {
    pub mod logging;
}
pub mod env;
