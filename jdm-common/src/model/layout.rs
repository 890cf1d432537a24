// jdm-common/src/model/layout.rs
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::descriptor::Descriptor;
use crate::error::{JdmError, Result};

/// How artifacts are arranged below a repository or destination root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryLayout {
    /// `group/as/path/artifact/version/artifact-version.jar`
    #[default]
    Maven,
    /// `artifact-version.jar` directly in the root.
    Flat,
}

impl RepositoryLayout {
    pub fn artifact_path(&self, root: &Path, descriptor: &Descriptor) -> PathBuf {
        match self {
            Self::Maven => root.join(descriptor.repository_path()),
            Self::Flat => root.join(descriptor.jar_file_name()),
        }
    }
}

impl fmt::Display for RepositoryLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Maven => write!(f, "maven"),
            Self::Flat => write!(f, "flat"),
        }
    }
}

impl FromStr for RepositoryLayout {
    type Err = JdmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "maven" => Ok(Self::Maven),
            "flat" => Ok(Self::Flat),
            other => Err(JdmError::Config(format!(
                "unknown repository layout '{other}' (expected 'maven' or 'flat')"
            ))),
        }
    }
}

/// Path of the `.sha256` sidecar that accompanies `artifact`.
pub fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact.as_os_str().to_os_string();
    name.push(".sha256");
    PathBuf::from(name)
}
