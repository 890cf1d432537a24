// jdm-common/src/lib.rs
pub mod config;
pub mod error;
pub mod manifest;
pub mod model;

// Re-export key types
pub use config::Config;
pub use error::{JdmError, Result};
pub use manifest::Manifest;
pub use model::{DependencyModel, Descriptor, ImportRequest, RepositoryLayout};
