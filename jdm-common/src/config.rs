// jdm-common/src/config.rs
use std::env;
use std::path::{Path, PathBuf};

use directories::UserDirs;
use tracing::debug;

use super::error::Result;
use crate::manifest::RepositorySection;
use crate::model::RepositoryLayout;

pub const MAVEN_CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2/";
const DEFAULT_DEST_DIR: &str = "lib";
const JDM_HOME_DIRNAME: &str = ".jdm";

#[derive(Debug, Clone)]
pub struct Config {
    pub local_repository: PathBuf,
    pub dest_dir: PathBuf,
    pub dest_layout: RepositoryLayout,
    pub remote_url: String,
    pub jdm_home: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading jdm configuration");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source, so the
    /// environment is only consulted by [`Config::load`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());
        let home = home_dir();

        let local_repository = var("JDM_LOCAL_REPO")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let fallback = home.join(".m2").join("repository");
                debug!(
                    "JDM_LOCAL_REPO not set, falling back to default: {}",
                    fallback.display()
                );
                fallback
            });

        let dest_dir = var("JDM_DEST")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DEST_DIR));

        let dest_layout = match var("JDM_LAYOUT") {
            Some(raw) => raw.parse()?,
            None => RepositoryLayout::Flat,
        };

        let remote_url = normalize_remote_url(
            &var("JDM_REMOTE_URL").unwrap_or_else(|| MAVEN_CENTRAL_URL.to_string()),
        );

        let jdm_home = var("JDM_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(JDM_HOME_DIRNAME));

        debug!("Effective local repository: {}", local_repository.display());
        debug!("Effective destination: {} ({})", dest_dir.display(), dest_layout);
        debug!("Effective remote repository: {}", remote_url);

        Ok(Self {
            local_repository,
            dest_dir,
            dest_layout,
            remote_url,
            jdm_home,
        })
    }

    /// Overlays values declared in a manifest's `[repository]` table.
    pub fn apply_manifest(&mut self, section: &RepositorySection) {
        if let Some(local) = &section.local {
            debug!("Manifest overrides local repository: {}", local.display());
            self.local_repository = local.clone();
        }
        if let Some(remote) = &section.remote {
            debug!("Manifest overrides remote repository: {}", remote);
            self.remote_url = normalize_remote_url(remote);
        }
        if let Some(dest) = &section.dest {
            debug!("Manifest overrides destination: {}", dest.display());
            self.dest_dir = dest.clone();
        }
        if let Some(layout) = section.layout {
            self.dest_layout = layout;
        }
    }

    pub fn local_repository(&self) -> &Path {
        &self.local_repository
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.jdm_home.join("logs")
    }
}

/// Remote base URLs always end with a slash so relative artifact paths can be
/// appended.
pub fn normalize_remote_url(url: &str) -> String {
    let url = url.trim();
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn home_dir() -> PathBuf {
    UserDirs::new().map_or_else(|| PathBuf::from("/"), |ud| ud.home_dir().to_path_buf())
}
