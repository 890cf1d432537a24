// jdm-core/src/checksum.rs
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use jdm_common::error::{JdmError, Result};
use jdm_common::model::layout::sidecar_path;
use jdm_common::model::descriptor::parse_sha256;
use jdm_common::Descriptor;
use sha2::{Digest, Sha256};
use tracing::debug;

/// SHA-256 of the file at `path`, lowercase hex.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let bytes_read = io::copy(&mut reader, &mut hasher)?;
    let actual = hex::encode(hasher.finalize());
    debug!(
        "Calculated SHA256 of {}: {} ({} bytes read)",
        path.display(),
        actual,
        bytes_read
    );
    Ok(actual)
}

/// Copies `reader` into `writer`, returning the SHA-256 of the bytes copied.
pub fn copy_hashing<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
        writer.write_all(&buffer[..n])?;
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Reads the expected checksum from the `.sha256` sidecar of `artifact`, if
/// there is one. Accepts a bare digest or `sha256sum` output.
pub fn read_sidecar(descriptor: &Descriptor, artifact: &Path) -> Result<Option<String>> {
    let path = sidecar_path(artifact);
    if !path.is_file() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path).map_err(|e| JdmError::io_for(descriptor, &path, e))?;
    let token = raw.split_whitespace().next().unwrap_or_default();
    let digest = parse_sha256(&descriptor.to_string(), token)?;
    debug!("Sidecar {} expects {}", path.display(), digest);
    Ok(Some(digest))
}

pub fn write_sidecar(descriptor: &Descriptor, artifact: &Path, sha256: &str) -> Result<()> {
    let path = sidecar_path(artifact);
    let file_name = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    crate::fs::atomic_write_file(&path, format!("{sha256}  {file_name}\n").as_bytes())
        .map_err(|e| JdmError::io_for(descriptor, &path, e))
}

/// Fails with a checksum mismatch unless `actual` equals `expected`.
pub fn ensure_matches(
    descriptor: &Descriptor,
    path: &Path,
    expected: &str,
    actual: &str,
) -> Result<()> {
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(JdmError::ChecksumMismatch {
            descriptor: descriptor.to_string(),
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}
