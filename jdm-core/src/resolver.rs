// jdm-core/src/resolver.rs
//! Finds dependency artifacts in local repositories.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jdm_common::error::{JdmError, Result};
use jdm_common::{Descriptor, ImportRequest, RepositoryLayout};
use jdm_net::RemoteRepository;
use tracing::{debug, info, warn};

use crate::checksum::{ensure_matches, read_sidecar, sha256_file};

/// A filesystem root searched during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepository {
    root: PathBuf,
    layout: RepositoryLayout,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>, layout: RepositoryLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn maven(root: impl Into<PathBuf>) -> Self {
        Self::new(root, RepositoryLayout::Maven)
    }

    pub fn flat(root: impl Into<PathBuf>) -> Self {
        Self::new(root, RepositoryLayout::Flat)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> RepositoryLayout {
        self.layout
    }

    pub fn artifact_path(&self, descriptor: &Descriptor) -> PathBuf {
        self.layout.artifact_path(&self.root, descriptor)
    }
}

/// An artifact located on disk together with its actual checksum and, when
/// known, the checksum it is expected to have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub descriptor: Descriptor,
    pub path: PathBuf,
    pub checksum: String,
    pub expected_sha256: Option<String>,
}

impl ResolvedArtifact {
    /// Checks the resolved file against its expected checksum. Artifacts with
    /// no expectation always pass.
    pub fn verify(&self) -> Result<()> {
        match &self.expected_sha256 {
            Some(expected) => ensure_matches(&self.descriptor, &self.path, expected, &self.checksum),
            None => Ok(()),
        }
    }
}

/// Source of artifacts that no local repository holds.
pub trait ArtifactFetcher: fmt::Debug + Send + Sync {
    /// Where artifacts come from, for log messages.
    fn location(&self) -> String;

    /// Places the artifact for `descriptor` at `target`. An artifact the
    /// source does not have is a NotFound.
    fn fetch(&self, descriptor: &Descriptor, target: &Path) -> Result<()>;
}

impl ArtifactFetcher for RemoteRepository {
    fn location(&self) -> String {
        self.base_url().to_string()
    }

    fn fetch(&self, descriptor: &Descriptor, target: &Path) -> Result<()> {
        self.fetch_artifact(descriptor, target).map(|_| ())
    }
}

/// Resolves a single descriptor against one Maven-layout repository root.
pub fn resolve(descriptor: &Descriptor, root: &Path) -> Result<ResolvedArtifact> {
    LocalResolver::new(vec![LocalRepository::maven(root)]).resolve(descriptor)
}

/// Searches an ordered list of local repositories, optionally falling back to
/// a remote repository for artifacts that are missing everywhere.
#[derive(Debug, Clone)]
pub struct LocalResolver {
    repositories: Vec<LocalRepository>,
    remote: Option<Arc<dyn ArtifactFetcher>>,
}

impl LocalResolver {
    pub fn new(repositories: Vec<LocalRepository>) -> Self {
        Self {
            repositories,
            remote: None,
        }
    }

    /// Missing artifacts are downloaded into the first repository.
    pub fn with_remote(mut self, remote: impl ArtifactFetcher + 'static) -> Self {
        self.remote = Some(Arc::new(remote));
        self
    }

    pub fn repositories(&self) -> &[LocalRepository] {
        &self.repositories
    }

    pub fn resolve(&self, descriptor: &Descriptor) -> Result<ResolvedArtifact> {
        self.resolve_request(&ImportRequest::new(descriptor.clone()))
    }

    pub fn resolve_request(&self, request: &ImportRequest) -> Result<ResolvedArtifact> {
        let descriptor = &request.descriptor;
        debug!("Resolving '{}'", descriptor);

        let mut searched = match self.resolve_locally(request) {
            Err(JdmError::NotFound { searched, .. }) => searched,
            other => return other,
        };
        let not_found = |searched: Vec<PathBuf>| JdmError::NotFound {
            descriptor: descriptor.to_string(),
            searched,
        };

        let (Some(remote), Some(target_repo)) = (&self.remote, self.repositories.first()) else {
            return Err(not_found(searched));
        };

        let target = target_repo.artifact_path(descriptor);
        info!("'{}' not found locally, fetching from {}", descriptor, remote.location());
        match remote.fetch(descriptor, &target) {
            Ok(()) => {}
            Err(JdmError::NotFound {
                searched: remote_searched,
                ..
            }) => {
                searched.extend(remote_searched);
                return Err(not_found(searched));
            }
            Err(e) => {
                warn!("Remote fetch of '{}' failed: {}", descriptor, e);
                return Err(e);
            }
        }
        match resolve_at(request, &target)? {
            Some(resolved) => Ok(resolved),
            None => {
                searched.push(target);
                Err(not_found(searched))
            }
        }
    }

    fn resolve_locally(&self, request: &ImportRequest) -> Result<ResolvedArtifact> {
        let descriptor = &request.descriptor;
        let mut searched = Vec::with_capacity(self.repositories.len());

        for repository in &self.repositories {
            let candidate = repository.artifact_path(descriptor);
            debug!("Checking {}", candidate.display());
            if let Some(resolved) = resolve_at(request, &candidate)? {
                debug!("Resolved '{}' to {}", descriptor, resolved.path.display());
                return Ok(resolved);
            }
            searched.push(candidate);
        }

        Err(JdmError::NotFound {
            descriptor: descriptor.to_string(),
            searched,
        })
    }
}

/// `Ok(None)` when nothing usable sits at `candidate`.
fn resolve_at(request: &ImportRequest, candidate: &Path) -> Result<Option<ResolvedArtifact>> {
    let descriptor = &request.descriptor;
    if !candidate.is_file() {
        if candidate.exists() {
            debug!("{} exists but is not a regular file", candidate.display());
        }
        return Ok(None);
    }

    let checksum =
        sha256_file(candidate).map_err(|e| JdmError::io_for(descriptor, candidate, e))?;
    let expected_sha256 = match &request.expected_sha256 {
        Some(pinned) => Some(pinned.clone()),
        None => read_sidecar(descriptor, candidate)?,
    };

    Ok(Some(ResolvedArtifact {
        descriptor: descriptor.clone(),
        path: candidate.to_path_buf(),
        checksum,
        expected_sha256,
    }))
}
