// jdm-core/src/record.rs
//! Ledger of artifacts imported into a destination directory.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use jdm_common::error::{JdmError, Result};
use jdm_common::Descriptor;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::checksum::sha256_file;
use crate::importer::ImportedArtifact;

pub const RECORD_FILE_NAME: &str = ".jdm-imports.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    /// Relative to the destination directory.
    pub path: PathBuf,
    pub sha256: String,
    pub imported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    #[serde(default)]
    pub artifacts: BTreeMap<Descriptor, RecordEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyStatus {
    Ok,
    Missing,
    Modified { actual: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub descriptor: Descriptor,
    pub path: PathBuf,
    pub status: VerifyStatus,
}

impl ImportRecord {
    pub fn path(dest: &Path) -> PathBuf {
        dest.join(RECORD_FILE_NAME)
    }

    /// A destination without a record yields an empty one. Malformed JSON
    /// is reported as `InvalidData`.
    pub fn load(dest: &Path) -> io::Result<Self> {
        let path = Self::path(dest);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!("Reading import record {}", path.display());
                Ok(serde_json::from_slice(&bytes)?)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, dest: &Path) -> io::Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        crate::fs::atomic_write_file(&Self::path(dest), &bytes)
    }

    pub fn insert(&mut self, dest: &Path, imported: &ImportedArtifact) {
        self.artifacts.insert(
            imported.descriptor.clone(),
            RecordEntry {
                path: relative_to(dest, &imported.path),
                sha256: imported.checksum.clone(),
                imported_at: Utc::now(),
            },
        );
    }

    /// The recorded coordinate whose artifact lives at `path`, if any.
    pub fn owner_of(&self, dest: &Path, path: &Path) -> Option<&Descriptor> {
        let relative = relative_to(dest, path);
        self.artifacts
            .iter()
            .find(|(_, entry)| entry.path == relative)
            .map(|(descriptor, _)| descriptor)
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Re-hashes every recorded artifact.
    pub fn verify(&self, dest: &Path) -> Result<Vec<VerifyReport>> {
        let mut reports = Vec::with_capacity(self.artifacts.len());
        for (descriptor, entry) in &self.artifacts {
            let path = dest.join(&entry.path);
            let status = match sha256_file(&path) {
                Ok(actual) if actual.eq_ignore_ascii_case(&entry.sha256) => VerifyStatus::Ok,
                Ok(actual) => {
                    warn!("'{}' at {} was modified", descriptor, path.display());
                    VerifyStatus::Modified { actual }
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("'{}' is missing from {}", descriptor, path.display());
                    VerifyStatus::Missing
                }
                Err(e) => return Err(JdmError::io_for(descriptor, &path, e)),
            };
            reports.push(VerifyReport {
                descriptor: descriptor.clone(),
                path,
                status,
            });
        }
        Ok(reports)
    }

    /// `.jar` files below `dest` that no record entry accounts for.
    pub fn untracked_jars(&self, dest: &Path) -> Vec<PathBuf> {
        if !dest.is_dir() {
            return Vec::new();
        }
        let tracked: HashSet<&Path> = self.artifacts.values().map(|e| e.path.as_path()).collect();
        let mut untracked: Vec<PathBuf> = WalkDir::new(dest)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry below {}: {}", dest.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"))
            })
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(dest).ok()?.to_path_buf();
                (!tracked.contains(relative.as_path())).then_some(relative)
            })
            .collect();
        untracked.sort();
        untracked
    }
}

fn relative_to(dest: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(dest)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::ImportOutcome;

    fn imported(dest: &Path, coord: &str, file: &str, body: &[u8]) -> ImportedArtifact {
        let path = dest.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        ImportedArtifact {
            descriptor: coord.parse().unwrap(),
            checksum: sha256_file(&path).unwrap(),
            path,
            outcome: ImportOutcome::Copied,
        }
    }

    #[test]
    fn missing_record_loads_empty() {
        let dest = tempfile::tempdir().unwrap();
        assert!(ImportRecord::load(dest.path()).unwrap().is_empty());
    }

    #[test]
    fn corrupt_record_is_invalid_data() {
        let dest = tempfile::tempdir().unwrap();
        fs::write(ImportRecord::path(dest.path()), b"{ nope").unwrap();
        let err = ImportRecord::load(dest.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn entries_persist_with_relative_paths() {
        let dest = tempfile::tempdir().unwrap();
        let a = imported(dest.path(), "g:a:1", "a-1.jar", b"a");
        let mut record = ImportRecord::default();
        record.insert(dest.path(), &a);
        record.save(dest.path()).unwrap();

        let record = ImportRecord::load(dest.path()).unwrap();
        let entry = &record.artifacts[&a.descriptor];
        assert_eq!(entry.path, PathBuf::from("a-1.jar"));
        assert_eq!(entry.sha256, a.checksum);

        let raw = fs::read_to_string(ImportRecord::path(dest.path())).unwrap();
        assert!(raw.contains("\"g:a:1\""));
    }

    #[test]
    fn verify_reports_modified_and_missing() {
        let dest = tempfile::tempdir().unwrap();
        let a = imported(dest.path(), "g:a:1", "a-1.jar", b"a");
        let b = imported(dest.path(), "g:b:1", "b-1.jar", b"b");
        let c = imported(dest.path(), "g:c:1", "c-1.jar", b"c");
        let mut record = ImportRecord::default();
        for artifact in [&a, &b, &c] {
            record.insert(dest.path(), artifact);
        }

        fs::write(&b.path, b"patched").unwrap();
        fs::remove_file(&c.path).unwrap();

        let reports = record.verify(dest.path()).unwrap();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].status, VerifyStatus::Ok);
        assert!(matches!(reports[1].status, VerifyStatus::Modified { .. }));
        assert_eq!(reports[2].status, VerifyStatus::Missing);
    }

    #[test]
    fn finds_untracked_jars() {
        let dest = tempfile::tempdir().unwrap();
        let a = imported(dest.path(), "g:a:1", "a-1.jar", b"a");
        fs::create_dir_all(dest.path().join("extra")).unwrap();
        fs::write(dest.path().join("extra/manual-2.jar"), b"m").unwrap();
        fs::write(dest.path().join("notes.txt"), b"n").unwrap();

        let mut record = ImportRecord::default();
        record.insert(dest.path(), &a);
        assert_eq!(
            record.untracked_jars(dest.path()),
            vec![PathBuf::from("extra/manual-2.jar")]
        );
    }

    #[test]
    fn owner_of_matches_recorded_path() {
        let dest = tempfile::tempdir().unwrap();
        let a = imported(dest.path(), "com.a:util:1.0", "util-1.0.jar", b"a");
        let mut record = ImportRecord::default();
        record.insert(dest.path(), &a);

        assert_eq!(record.owner_of(dest.path(), &a.path), Some(&a.descriptor));
        assert_eq!(record.owner_of(dest.path(), &dest.path().join("other-1.0.jar")), None);
    }

    #[test]
    fn missing_destination_has_no_untracked_jars() {
        let dest = tempfile::tempdir().unwrap();
        let absent = dest.path().join("lib");
        assert!(ImportRecord::default().untracked_jars(&absent).is_empty());
    }
}
