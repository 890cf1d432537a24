// jdm-net/src/validation.rs
use jdm_common::error::{JdmError, Result};
use url::Url;

/// Parses a repository URL, ensuring it uses the HTTPS scheme.
pub fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str).map_err(|e| {
        JdmError::ValidationError(format!("Failed to parse URL '{url_str}': {e}"))
    })?;
    if url.scheme() == "https" {
        Ok(url)
    } else {
        Err(JdmError::ValidationError(format!(
            "Invalid URL scheme for '{}': Must be https, but got '{}'",
            url_str,
            url.scheme()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https() {
        assert!(validate_url("https://repo.maven.apache.org/maven2/").is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        for bad in ["http://repo.example.com/", "ftp://x/", "not a url"] {
            assert!(
                matches!(validate_url(bad), Err(JdmError::ValidationError(_))),
                "{bad}"
            );
        }
    }
}
