// jdm-core/src/lib.rs
//! Resolution and import engine: finds artifacts in local repositories,
//! verifies them and copies them where they are needed.

pub mod checksum;
pub mod fs;
pub mod importer;
pub mod record;
pub mod resolver;

pub use importer::{ImportOutcome, ImportedArtifact, Importer};
pub use record::{ImportRecord, VerifyReport, VerifyStatus};
pub use resolver::{resolve, ArtifactFetcher, LocalRepository, LocalResolver, ResolvedArtifact};
