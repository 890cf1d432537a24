// jdm-net/src/http.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jdm_common::config::normalize_remote_url;
use jdm_common::error::{JdmError, Result};
use jdm_common::model::layout::sidecar_path;
use jdm_common::Descriptor;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};
use url::Url;

use crate::validation::validate_url;

const DOWNLOAD_TIMEOUT_SECS: u64 = 300;
const CONNECT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT_STRING: &str = concat!("jdm/", env!("CARGO_PKG_VERSION"), " (Rust)");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DownloadStatus {
    Saved,
    Missing,
}

/// A remote Maven repository such as Maven Central.
#[derive(Debug, Clone)]
pub struct RemoteRepository {
    base: Url,
    client: Client,
}

impl RemoteRepository {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = validate_url(&normalize_remote_url(base_url))?;
        let client = build_http_client()?;
        debug!("Using remote repository {}", base);
        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `<base>/group/as/path/artifact/version/artifact-version.jar`
    pub fn artifact_url(&self, descriptor: &Descriptor) -> Result<Url> {
        let relative = format!(
            "{}/{}/{}/{}",
            descriptor.group().replace('.', "/"),
            descriptor.artifact(),
            descriptor.version(),
            descriptor.jar_file_name()
        );
        self.base.join(&relative).map_err(|e| {
            JdmError::ValidationError(format!(
                "Cannot build URL for '{descriptor}' below {}: {e}",
                self.base
            ))
        })
    }

    /// Downloads the artifact to `target`, plus its `.sha256` sidecar when the
    /// remote publishes one. A 404 on the artifact itself is a NotFound.
    pub fn fetch_artifact(&self, descriptor: &Descriptor, target: &Path) -> Result<PathBuf> {
        let url = self.artifact_url(descriptor)?;
        debug!("Fetching '{}' from {} into {}", descriptor, url, target.display());

        match self.download_to(descriptor, &url, target)? {
            DownloadStatus::Saved => {}
            DownloadStatus::Missing => {
                return Err(JdmError::NotFound {
                    descriptor: descriptor.to_string(),
                    searched: vec![PathBuf::from(url.as_str())],
                });
            }
        }

        let sidecar_url = Url::parse(&format!("{url}.sha256")).map_err(|e| {
            JdmError::ValidationError(format!("Cannot build checksum URL for '{descriptor}': {e}"))
        })?;
        match self.download_to(descriptor, &sidecar_url, &sidecar_path(target)) {
            Ok(DownloadStatus::Saved) => debug!("Saved checksum sidecar from {}", sidecar_url),
            Ok(DownloadStatus::Missing) => debug!("No checksum published at {}", sidecar_url),
            Err(e) => warn!("Could not fetch checksum sidecar {}: {}", sidecar_url, e),
        }

        Ok(target.to_path_buf())
    }

    fn download_to(
        &self,
        descriptor: &Descriptor,
        url: &Url,
        target: &Path,
    ) -> Result<DownloadStatus> {
        let download_err =
            |reason: String| JdmError::DownloadError(descriptor.to_string(), url.to_string(), reason);

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| download_err(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("{} returned 404", url);
            return Ok(DownloadStatus::Missing);
        }
        if !status.is_success() {
            error!("Download from {} failed with status {}", url, status);
            return Err(download_err(format!("HTTP status {status}")));
        }

        let parent = target.parent().ok_or_else(|| {
            JdmError::io_for(
                descriptor,
                target,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "target has no parent"),
            )
        })?;
        fs::create_dir_all(parent).map_err(|e| JdmError::io_for(descriptor, parent, e))?;

        let mut temp =
            NamedTempFile::new_in(parent).map_err(|e| JdmError::io_for(descriptor, parent, e))?;
        let bytes = response
            .copy_to(&mut temp)
            .map_err(|e| download_err(e.to_string()))?;
        temp.persist(target)
            .map_err(|e| JdmError::io_for(descriptor, target, e.error))?;

        debug!("Wrote {} bytes to {}", bytes, target.display());
        Ok(DownloadStatus::Saved)
    }
}

fn build_http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    Client::builder()
        .user_agent(USER_AGENT_STRING)
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .build()
        .map_err(JdmError::from)
}
