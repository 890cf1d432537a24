// jdm-common/src/model/descriptor.rs
//! Dependency coordinates and the parser that builds them from manifest
//! entries or `group:artifact:version` strings.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{JdmError, Result};

/// A `group:artifact:version` coordinate. Fields are validated on
/// construction and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Descriptor {
    group: String,
    artifact: String,
    version: String,
}

/// Raw dependency entry as it appears in a manifest, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyModel {
    #[serde(default, alias = "groupId")]
    pub group: Option<String>,
    #[serde(default, alias = "artifactId")]
    pub artifact: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
}

/// A descriptor plus an optional pinned SHA-256 the artifact must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub descriptor: Descriptor,
    pub expected_sha256: Option<String>,
}

impl Descriptor {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let group = group.into();
        let artifact = artifact.into();
        let version = version.into();
        let input = format!("{group}:{artifact}:{version}");

        let group = validate_field(&input, "group", &group)?;
        let artifact = validate_field(&input, "artifact", &artifact)?;
        let version = validate_field(&input, "version", &version)?;

        if group.starts_with('.') || group.ends_with('.') || group.contains("..") {
            return Err(JdmError::parse(
                input,
                format!("group '{group}' has an empty segment"),
            ));
        }

        Ok(Self {
            group,
            artifact,
            version,
        })
    }

    /// Builds a descriptor from a manifest model object.
    pub fn from_model(model: &DependencyModel) -> Result<Self> {
        let shown = model_display(model);
        let group = require(&shown, "group", model.group.as_deref())?;
        let artifact = require(&shown, "artifact", model.artifact.as_deref())?;
        let version = require(&shown, "version", model.version.as_deref())?;
        Self::new(group, artifact, version)
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `com/google/code/gson` for `com.google.code.gson`.
    pub fn group_path(&self) -> PathBuf {
        self.group.split('.').collect()
    }

    /// Directory of this artifact inside a Maven-layout repository.
    pub fn repository_dir(&self) -> PathBuf {
        self.group_path().join(&self.artifact).join(&self.version)
    }

    pub fn jar_file_name(&self) -> String {
        format!("{}-{}.jar", self.artifact, self.version)
    }

    /// `group-as-path/artifact/version/artifact-version.jar`
    pub fn repository_path(&self) -> PathBuf {
        self.repository_dir().join(self.jar_file_name())
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

impl FromStr for Descriptor {
    type Err = JdmError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            [group, artifact, version] => Self::new(*group, *artifact, *version),
            _ => Err(JdmError::parse(
                s,
                format!(
                    "expected 'group:artifact:version', found {} part(s)",
                    parts.len()
                ),
            )),
        }
    }
}

impl TryFrom<String> for Descriptor {
    type Error = JdmError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Descriptor> for String {
    fn from(value: Descriptor) -> Self {
        value.to_string()
    }
}

impl ImportRequest {
    pub fn new(descriptor: Descriptor) -> Self {
        Self {
            descriptor,
            expected_sha256: None,
        }
    }

    pub fn pinned(descriptor: Descriptor, sha256: &str) -> Result<Self> {
        let expected = parse_sha256(&descriptor.to_string(), sha256)?;
        Ok(Self {
            descriptor,
            expected_sha256: Some(expected),
        })
    }

    pub fn from_model(model: &DependencyModel) -> Result<Self> {
        let descriptor = Descriptor::from_model(model)?;
        match model.sha256.as_deref() {
            Some(sha) => Self::pinned(descriptor, sha),
            None => Ok(Self::new(descriptor)),
        }
    }
}

/// Normalizes a hex SHA-256 to lowercase, rejecting anything that is not
/// exactly 64 hex digits.
pub fn parse_sha256(input: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.len() != 64 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(JdmError::parse(
            input,
            format!("'{value}' is not a SHA-256 hex digest"),
        ));
    }
    Ok(value.to_ascii_lowercase())
}

fn require<'a>(input: &str, field: &str, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or_else(|| JdmError::parse(input, format!("missing required field '{field}'")))
}

fn validate_field(input: &str, field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(JdmError::parse(input, format!("{field} is empty")));
    }
    if value == "." || value == ".." {
        return Err(JdmError::parse(
            input,
            format!("{field} '{value}' is not a valid name"),
        ));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, ':' | '/' | '\\' | '?' | '#' | '%'))
    {
        return Err(JdmError::parse(
            input,
            format!("{field} '{value}' contains invalid character {bad:?}"),
        ));
    }
    Ok(value.to_string())
}

fn model_display(model: &DependencyModel) -> String {
    let part = |v: &Option<String>| v.clone().unwrap_or_else(|| "?".to_string());
    format!(
        "{}:{}:{}",
        part(&model.group),
        part(&model.artifact),
        part(&model.version)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(group: Option<&str>, artifact: Option<&str>, version: Option<&str>) -> DependencyModel {
        DependencyModel {
            group: group.map(String::from),
            artifact: artifact.map(String::from),
            version: version.map(String::from),
            sha256: None,
        }
    }

    #[test]
    fn parses_coordinate_string() {
        let d: Descriptor = "com.google.code.gson:gson:2.9.0".parse().unwrap();
        assert_eq!(d.group(), "com.google.code.gson");
        assert_eq!(d.artifact(), "gson");
        assert_eq!(d.version(), "2.9.0");
        assert_eq!(d.to_string(), "com.google.code.gson:gson:2.9.0");
    }

    #[test]
    fn builds_repository_path() {
        let d: Descriptor = "com.google.code.gson:gson:2.9.0".parse().unwrap();
        assert_eq!(
            d.repository_path(),
            PathBuf::from("com/google/code/gson/gson/2.9.0/gson-2.9.0.jar")
        );
        assert_eq!(d.jar_file_name(), "gson-2.9.0.jar");
    }

    #[test]
    fn rejects_wrong_part_count() {
        for bad in ["gson", "com.google:gson", "a:b:c:d", ""] {
            let err = bad.parse::<Descriptor>().unwrap_err();
            assert!(matches!(err, JdmError::ParseError { .. }), "{bad}");
        }
    }

    #[test]
    fn rejects_malformed_fields() {
        for bad in [
            "com..google:gson:1",
            ".com:gson:1",
            "com.:gson:1",
            "com:gs on:1",
            "com:gson:..",
            "com:gson: ",
            "com:../gson:1",
            "com:gson:1.0?x=1",
            "com:gson#frag:1",
            "com%2e:gson:1",
        ] {
            assert!(bad.parse::<Descriptor>().is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn model_with_missing_field_is_a_parse_error() {
        let err = Descriptor::from_model(&model(Some("org.slf4j"), None, Some("2.0.9"))).unwrap_err();
        match err {
            JdmError::ParseError { input, reason } => {
                assert_eq!(input, "org.slf4j:?:2.0.9");
                assert!(reason.contains("artifact"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn model_fields_are_trimmed() {
        let d = Descriptor::from_model(&model(Some(" org.slf4j "), Some("slf4j-api"), Some("2.0.9\n")))
            .unwrap();
        assert_eq!(d.to_string(), "org.slf4j:slf4j-api:2.0.9");
    }

    #[test]
    fn pinned_checksum_is_validated() {
        let d: Descriptor = "g:a:1".parse().unwrap();
        let upper = "AB".repeat(32);
        let req = ImportRequest::pinned(d.clone(), &upper).unwrap();
        assert_eq!(req.expected_sha256.as_deref(), Some("ab".repeat(32).as_str()));
        assert!(ImportRequest::pinned(d.clone(), "abc").is_err());
        assert!(ImportRequest::pinned(d, &"zz".repeat(32)).is_err());
    }

    #[test]
    fn serializes_as_coordinate_string() {
        let d: Descriptor = "g.h:a:1.0".parse().unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"g.h:a:1.0\"");
        let back: Descriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
        assert!(serde_json::from_str::<Descriptor>("\"nope\"").is_err());
    }
}
