// jdm-net/src/lib.rs
pub mod http;
pub mod validation;

pub use http::RemoteRepository;
pub use validation::validate_url;
