// jdm-common/src/manifest.rs
//! Project manifest listing the dependencies to import.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{JdmError, Result};
use crate::model::{DependencyModel, ImportRequest, RepositoryLayout};

/// Optional `[repository]` table overriding configured locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySection {
    #[serde(default)]
    pub local: Option<PathBuf>,
    #[serde(default)]
    pub remote: Option<String>,
    #[serde(default)]
    pub dest: Option<PathBuf>,
    #[serde(default)]
    pub layout: Option<RepositoryLayout>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub repository: RepositorySection,
    #[serde(default)]
    pub dependencies: Vec<DependencyModel>,
}

impl Manifest {
    /// Reads a manifest from disk. `.json` files are parsed as JSON,
    /// everything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading manifest from {}", path.display());
        let raw = fs::read_to_string(path).map_err(|e| {
            JdmError::Config(format!("Cannot read manifest {}: {e}", path.display()))
        })?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let manifest = if is_json {
            Self::from_json_str(&raw)?
        } else {
            Self::from_toml_str(&raw)?
        };
        debug!(
            "Manifest {} declares {} dependencies",
            path.display(),
            manifest.dependencies.len()
        );
        Ok(manifest)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Malformed JSON is a parse error, the same class as malformed TOML.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| JdmError::parse("JSON manifest", e.to_string()))
    }

    /// Validates every entry, failing on the first malformed one.
    pub fn requests(&self) -> Result<Vec<ImportRequest>> {
        self.dependencies
            .iter()
            .enumerate()
            .map(|(index, model)| {
                ImportRequest::from_model(model).map_err(|e| match e {
                    JdmError::ParseError { input, reason } => JdmError::ParseError {
                        input,
                        reason: format!("dependencies[{index}]: {reason}"),
                    },
                    other => other,
                })
            })
            .collect()
    }
}
