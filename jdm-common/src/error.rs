use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum JdmError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("HTTP Request Error: {0}")]
    Http(#[from] Arc<reqwest::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("TOML Parsing Error: {0}")]
    Toml(#[from] Arc<toml::de::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Parse Error in '{input}': {reason}")]
    ParseError { input: String, reason: String },

    #[error("Not Found: '{descriptor}' (searched: {})", display_paths(.searched))]
    NotFound {
        descriptor: String,
        searched: Vec<PathBuf>,
    },

    #[error("Checksum Mismatch for '{descriptor}' at {}: expected {expected}, got {actual}", .path.display())]
    ChecksumMismatch {
        descriptor: String,
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("IoError for '{descriptor}' at {}: {source}", .path.display())]
    IoError {
        descriptor: String,
        path: PathBuf,
        source: Arc<std::io::Error>,
    },

    #[error("Conflict: '{descriptor}' would overwrite '{existing}' at {}", .path.display())]
    Conflict {
        descriptor: String,
        existing: String,
        path: PathBuf,
    },

    #[error("DownloadError: Failed to download '{0}' from '{1}': {2}")]
    DownloadError(String, String, String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("Verification Failed: {0}")]
    Verification(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl JdmError {
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        JdmError::ParseError {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Wraps an I/O failure that happened while handling `descriptor`.
    pub fn io_for(
        descriptor: impl ToString,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        JdmError::IoError {
            descriptor: descriptor.to_string(),
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// The coordinate (or raw input) the error is about, if any.
    pub fn descriptor(&self) -> Option<&str> {
        match self {
            JdmError::ParseError { input, .. } => Some(input),
            JdmError::NotFound { descriptor, .. }
            | JdmError::ChecksumMismatch { descriptor, .. }
            | JdmError::IoError { descriptor, .. }
            | JdmError::Conflict { descriptor, .. } => Some(descriptor),
            JdmError::DownloadError(descriptor, _, _) => Some(descriptor),
            _ => None,
        }
    }

    /// Process exit code for this class of failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            JdmError::ParseError { .. } | JdmError::Toml(_) => 2,
            JdmError::NotFound { .. } => 3,
            JdmError::ChecksumMismatch { .. } => 4,
            JdmError::IoError { .. } | JdmError::Io(_) => 5,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for JdmError {
    fn from(err: std::io::Error) -> Self {
        JdmError::Io(Arc::new(err))
    }
}

impl From<reqwest::Error> for JdmError {
    fn from(err: reqwest::Error) -> Self {
        JdmError::Http(Arc::new(err))
    }
}

impl From<serde_json::Error> for JdmError {
    fn from(err: serde_json::Error) -> Self {
        JdmError::Json(Arc::new(err))
    }
}

impl From<toml::de::Error> for JdmError {
    fn from(err: toml::de::Error) -> Self {
        JdmError::Toml(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, JdmError>;
