// jdm-common/src/model/mod.rs
pub mod descriptor;
pub mod layout;

pub use descriptor::{DependencyModel, Descriptor, ImportRequest};
pub use layout::RepositoryLayout;
