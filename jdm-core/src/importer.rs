// jdm-core/src/importer.rs
//! Copies resolved artifacts into a destination directory.

use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use jdm_common::error::{JdmError, Result};
use jdm_common::{Descriptor, ImportRequest, RepositoryLayout};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::checksum::{copy_hashing, ensure_matches, read_sidecar, sha256_file, write_sidecar};
use crate::record::ImportRecord;
use crate::resolver::{LocalResolver, ResolvedArtifact};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportOutcome {
    /// The destination did not hold the artifact before.
    Copied,
    /// A different file at the destination was overwritten.
    Replaced,
    /// An identical file was already there; nothing was copied.
    AlreadyPresent,
}

impl fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copied => write!(f, "imported"),
            Self::Replaced => write!(f, "replaced"),
            Self::AlreadyPresent => write!(f, "already present"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedArtifact {
    pub descriptor: Descriptor,
    pub path: PathBuf,
    pub checksum: String,
    pub outcome: ImportOutcome,
}

#[derive(Debug, Clone)]
pub struct Importer {
    dest: PathBuf,
    layout: RepositoryLayout,
    force: bool,
}

impl Importer {
    pub fn new(dest: impl Into<PathBuf>, layout: RepositoryLayout) -> Self {
        Self {
            dest: dest.into(),
            layout,
            force: false,
        }
    }

    /// Copy even when an identical file is already at the destination.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    pub fn layout(&self) -> RepositoryLayout {
        self.layout
    }

    /// Verifies `artifact` and copies it into the destination. The
    /// destination is only touched once the copied bytes are known to match
    /// and the import record has been read.
    pub fn import(&self, artifact: &ResolvedArtifact) -> Result<ImportedArtifact> {
        let descriptor = &artifact.descriptor;
        artifact.verify()?;

        let mut record = ImportRecord::load(&self.dest)
            .map_err(|e| JdmError::io_for(descriptor, ImportRecord::path(&self.dest), e))?;

        let target = self.layout.artifact_path(&self.dest, descriptor);
        if let Some(owner) = record.owner_of(&self.dest, &target) {
            if owner != descriptor {
                return Err(JdmError::Conflict {
                    descriptor: descriptor.to_string(),
                    existing: owner.to_string(),
                    path: target,
                });
            }
        }
        let existed = target.is_file();

        if existed && (!self.force || same_file(&artifact.path, &target)) {
            let current =
                sha256_file(&target).map_err(|e| JdmError::io_for(descriptor, &target, e))?;
            if current == artifact.checksum {
                debug!("{} already holds '{}'", target.display(), descriptor);
                if self.layout == RepositoryLayout::Maven
                    && !sidecar_matches(descriptor, &target, &current)
                {
                    write_sidecar(descriptor, &target, &current)?;
                }
                return self.finish(
                    &mut record,
                    descriptor,
                    target,
                    current,
                    ImportOutcome::AlreadyPresent,
                );
            }
            debug!(
                "{} differs from resolved '{}' ({} vs {}), replacing",
                target.display(),
                descriptor,
                current,
                artifact.checksum
            );
        }

        let parent = crate::fs::parent_dir(&target)
            .map_err(|e| JdmError::io_for(descriptor, &target, e))?;
        fs::create_dir_all(parent).map_err(|e| JdmError::io_for(descriptor, parent, e))?;

        let mut source = File::open(&artifact.path)
            .map_err(|e| JdmError::io_for(descriptor, &artifact.path, e))?;
        let mut temp =
            NamedTempFile::new_in(parent).map_err(|e| JdmError::io_for(descriptor, parent, e))?;
        let copied = copy_hashing(&mut source, &mut temp)
            .and_then(|digest| temp.as_file().sync_all().map(|()| digest))
            .map_err(|e| JdmError::io_for(descriptor, &target, e))?;

        // Dropping `temp` on mismatch removes the partial copy.
        ensure_matches(descriptor, &artifact.path, &artifact.checksum, &copied)?;

        temp.persist(&target)
            .map_err(|e| JdmError::io_for(descriptor, &target, e.error))?;

        if self.layout == RepositoryLayout::Maven {
            write_sidecar(descriptor, &target, &copied)?;
        }

        let outcome = if existed {
            ImportOutcome::Replaced
        } else {
            ImportOutcome::Copied
        };
        debug!("{} '{}' -> {}", outcome, descriptor, target.display());
        self.finish(&mut record, descriptor, target, copied, outcome)
    }

    /// Resolves and imports each request in order, stopping at the first
    /// failure. `on_imported` sees every artifact as soon as it lands.
    pub fn resolve_and_import<F>(
        &self,
        resolver: &LocalResolver,
        requests: &[ImportRequest],
        mut on_imported: F,
    ) -> Result<Vec<ImportedArtifact>>
    where
        F: FnMut(&ImportedArtifact),
    {
        requests
            .iter()
            .map(|request| {
                let resolved = resolver.resolve_request(request)?;
                let imported = self.import(&resolved)?;
                on_imported(&imported);
                Ok(imported)
            })
            .collect()
    }

    fn finish(
        &self,
        record: &mut ImportRecord,
        descriptor: &Descriptor,
        path: PathBuf,
        checksum: String,
        outcome: ImportOutcome,
    ) -> Result<ImportedArtifact> {
        let imported = ImportedArtifact {
            descriptor: descriptor.clone(),
            path,
            checksum,
            outcome,
        };
        record.insert(&self.dest, &imported);
        record
            .save(&self.dest)
            .map_err(|e| JdmError::io_for(descriptor, ImportRecord::path(&self.dest), e))?;
        Ok(imported)
    }
}

fn sidecar_matches(descriptor: &Descriptor, artifact: &Path, sha256: &str) -> bool {
    matches!(read_sidecar(descriptor, artifact), Ok(Some(expected)) if expected == sha256)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{VerifyStatus, RECORD_FILE_NAME};
    use crate::resolver::{resolve, LocalRepository};

    fn slf4j() -> Descriptor {
        "org.slf4j:slf4j-api:2.0.9".parse().unwrap()
    }

    fn seeded_repo(body: &[u8]) -> tempfile::TempDir {
        let repo = tempfile::tempdir().unwrap();
        let path = repo.path().join(slf4j().repository_path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
        repo
    }

    #[test]
    fn copies_into_flat_destination() {
        let repo = seeded_repo(b"classes");
        let dest = tempfile::tempdir().unwrap();
        let resolved = resolve(&slf4j(), repo.path()).unwrap();

        let imported = Importer::new(dest.path(), RepositoryLayout::Flat)
            .import(&resolved)
            .unwrap();
        assert_eq!(imported.outcome, ImportOutcome::Copied);
        assert_eq!(imported.path, dest.path().join("slf4j-api-2.0.9.jar"));
        assert_eq!(fs::read(&imported.path).unwrap(), b"classes");
        assert_eq!(imported.checksum, resolved.checksum);
        assert!(!dest.path().join("slf4j-api-2.0.9.jar.sha256").exists());
        assert!(dest.path().join(RECORD_FILE_NAME).is_file());
    }

    #[test]
    fn import_then_resolve_yields_same_checksum() {
        let repo = seeded_repo(b"round trip");
        let dest = tempfile::tempdir().unwrap();
        let resolved = resolve(&slf4j(), repo.path()).unwrap();

        Importer::new(dest.path(), RepositoryLayout::Maven)
            .import(&resolved)
            .unwrap();

        let again = resolve(&slf4j(), dest.path()).unwrap();
        assert_eq!(again.checksum, resolved.checksum);
        assert_eq!(again.expected_sha256.as_deref(), Some(resolved.checksum.as_str()));
        assert!(again.verify().is_ok());
    }

    #[test]
    fn pinned_mismatch_leaves_destination_untouched() {
        let repo = seeded_repo(b"tampered");
        let dest = tempfile::tempdir().unwrap();
        let resolver = LocalResolver::new(vec![LocalRepository::maven(repo.path())]);
        let request = ImportRequest::pinned(slf4j(), &"a".repeat(64)).unwrap();
        let resolved = resolver.resolve_request(&request).unwrap();

        let err = Importer::new(dest.path(), RepositoryLayout::Flat)
            .import(&resolved)
            .unwrap_err();
        assert!(matches!(err, JdmError::ChecksumMismatch { .. }));
        assert_eq!(err.descriptor(), Some("org.slf4j:slf4j-api:2.0.9"));
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[test]
    fn source_changed_after_resolution_is_rejected() {
        let repo = seeded_repo(b"original");
        let dest = tempfile::tempdir().unwrap();
        let resolved = resolve(&slf4j(), repo.path()).unwrap();
        fs::write(&resolved.path, b"swapped underneath").unwrap();

        let err = Importer::new(dest.path(), RepositoryLayout::Flat)
            .import(&resolved)
            .unwrap_err();
        assert!(matches!(err, JdmError::ChecksumMismatch { .. }));
        assert!(!dest.path().join("slf4j-api-2.0.9.jar").exists());
    }

    #[test]
    fn second_import_is_already_present() {
        let repo = seeded_repo(b"classes");
        let dest = tempfile::tempdir().unwrap();
        let resolved = resolve(&slf4j(), repo.path()).unwrap();
        let importer = Importer::new(dest.path(), RepositoryLayout::Flat);

        assert_eq!(importer.import(&resolved).unwrap().outcome, ImportOutcome::Copied);
        assert_eq!(
            importer.import(&resolved).unwrap().outcome,
            ImportOutcome::AlreadyPresent
        );
        assert_eq!(
            importer.clone().with_force(true).import(&resolved).unwrap().outcome,
            ImportOutcome::Replaced
        );
    }

    #[test]
    fn stale_destination_file_is_replaced() {
        let repo = seeded_repo(b"new build");
        let dest = tempfile::tempdir().unwrap();
        fs::write(dest.path().join("slf4j-api-2.0.9.jar"), b"old build").unwrap();
        let resolved = resolve(&slf4j(), repo.path()).unwrap();

        let imported = Importer::new(dest.path(), RepositoryLayout::Flat)
            .import(&resolved)
            .unwrap();
        assert_eq!(imported.outcome, ImportOutcome::Replaced);
        assert_eq!(fs::read(&imported.path).unwrap(), b"new build");
    }

    #[test]
    fn unwritable_destination_is_an_io_error() {
        let repo = seeded_repo(b"classes");
        let dest = tempfile::tempdir().unwrap();
        // A regular file where the destination directory should be.
        let blocked = dest.path().join("lib");
        fs::write(&blocked, b"").unwrap();
        let resolved = resolve(&slf4j(), repo.path()).unwrap();

        let err = Importer::new(&blocked, RepositoryLayout::Flat)
            .import(&resolved)
            .unwrap_err();
        assert!(matches!(err, JdmError::IoError { .. }), "{err:?}");
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn batch_stops_at_first_failure() {
        let repo = seeded_repo(b"classes");
        let dest = tempfile::tempdir().unwrap();
        let resolver = LocalResolver::new(vec![LocalRepository::maven(repo.path())]);
        let missing: Descriptor = "org.slf4j:slf4j-simple:2.0.9".parse().unwrap();
        let mut seen = Vec::new();

        let err = Importer::new(dest.path(), RepositoryLayout::Flat)
            .resolve_and_import(
                &resolver,
                &[ImportRequest::new(slf4j()), ImportRequest::new(missing)],
                |imported| seen.push(imported.descriptor.clone()),
            )
            .unwrap_err();
        assert!(matches!(err, JdmError::NotFound { .. }));
        assert!(dest.path().join("slf4j-api-2.0.9.jar").is_file());
        assert_eq!(seen, vec![slf4j()]);
    }

    #[test]
    fn corrupt_record_fails_before_touching_destination() {
        let repo = seeded_repo(b"classes");
        let dest = tempfile::tempdir().unwrap();
        fs::write(dest.path().join(RECORD_FILE_NAME), b"{ not json").unwrap();
        let resolved = resolve(&slf4j(), repo.path()).unwrap();

        let err = Importer::new(dest.path(), RepositoryLayout::Flat)
            .import(&resolved)
            .unwrap_err();
        assert!(matches!(err, JdmError::IoError { .. }), "{err:?}");
        assert_eq!(err.descriptor(), Some("org.slf4j:slf4j-api:2.0.9"));
        assert!(!dest.path().join("slf4j-api-2.0.9.jar").exists());
    }

    #[test]
    fn flat_name_clash_is_refused() {
        let first: Descriptor = "com.a:util:1.0".parse().unwrap();
        let second: Descriptor = "org.b:util:1.0".parse().unwrap();
        let repo = tempfile::tempdir().unwrap();
        for (d, body) in [(&first, b"from a"), (&second, b"from b")] {
            let path = repo.path().join(d.repository_path());
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        let dest = tempfile::tempdir().unwrap();
        let importer = Importer::new(dest.path(), RepositoryLayout::Flat);

        importer
            .import(&resolve(&first, repo.path()).unwrap())
            .unwrap();
        let err = importer
            .import(&resolve(&second, repo.path()).unwrap())
            .unwrap_err();
        match &err {
            JdmError::Conflict {
                descriptor,
                existing,
                ..
            } => {
                assert_eq!(descriptor, "org.b:util:1.0");
                assert_eq!(existing, "com.a:util:1.0");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(fs::read(dest.path().join("util-1.0.jar")).unwrap(), b"from a");

        let reports = ImportRecord::load(dest.path())
            .unwrap()
            .verify(dest.path())
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, VerifyStatus::Ok);
    }

    #[test]
    fn already_present_maven_artifact_gets_missing_sidecar() {
        let repo = seeded_repo(b"classes");
        let dest = tempfile::tempdir().unwrap();
        let resolved = resolve(&slf4j(), repo.path()).unwrap();
        let importer = Importer::new(dest.path(), RepositoryLayout::Maven);

        let first = importer.import(&resolved).unwrap();
        let sidecar = dest.path().join(format!("{}.sha256", slf4j().repository_path().display()));
        fs::remove_file(&sidecar).unwrap();

        let again = importer.import(&resolved).unwrap();
        assert_eq!(again.outcome, ImportOutcome::AlreadyPresent);
        assert!(sidecar.is_file());
        let reresolved = resolve(&slf4j(), dest.path()).unwrap();
        assert_eq!(reresolved.expected_sha256.as_deref(), Some(first.checksum.as_str()));
    }
}
