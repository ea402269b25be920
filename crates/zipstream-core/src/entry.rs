//! One archive member: where to fetch it and where it lands in the ZIP.

use thiserror::Error;
use url::Url;

/// Why a raw descriptor record could not become a [`FileEntry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("invalid entry url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: url::ParseError },
    #[error("entry url {url:?} uses unsupported scheme {scheme:?}")]
    UnsupportedScheme { url: String, scheme: String },
    #[error("entry for {0} has an empty zip path")]
    EmptyZipPath(String),
}

/// Validated (source URL, archive path) pair.
///
/// Immutable once built; moved by value from the producer to the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    url: Url,
    zip_path: String,
}

impl FileEntry {
    /// Validate and build an entry. `url` must be an absolute `http(s)` URL
    /// (the parser insists on a host for these); `zip_path` must be non-empty.
    pub fn new(url: &str, zip_path: &str) -> Result<Self, EntryError> {
        let parsed = Url::parse(url).map_err(|reason| EntryError::InvalidUrl {
            url: url.to_string(),
            reason,
        })?;
        if !crate::fetch::is_http(&parsed) {
            return Err(EntryError::UnsupportedScheme {
                url: url.to_string(),
                scheme: parsed.scheme().to_string(),
            });
        }
        if zip_path.is_empty() {
            return Err(EntryError::EmptyZipPath(url.to_string()));
        }
        Ok(Self {
            url: parsed,
            zip_path: zip_path.to_string(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn zip_path(&self) -> &str {
        &self.zip_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_entry() {
        let e = FileEntry::new("https://example.com/a/b.txt", "docs/b.txt").unwrap();
        assert_eq!(e.url().as_str(), "https://example.com/a/b.txt");
        assert_eq!(e.zip_path(), "docs/b.txt");
    }

    #[test]
    fn relative_url_rejected() {
        let err = FileEntry::new("/a/b.txt", "b.txt").unwrap_err();
        assert!(matches!(err, EntryError::InvalidUrl { .. }));
    }

    #[test]
    fn empty_url_rejected() {
        assert!(FileEntry::new("", "b.txt").is_err());
    }

    #[test]
    fn hostless_url_rejected() {
        let err = FileEntry::new("http://", "x").unwrap_err();
        assert!(matches!(err, EntryError::InvalidUrl { .. }));
    }

    #[test]
    fn non_http_schemes_rejected() {
        for (raw, scheme) in [
            ("ftp://files.example.com/a.iso", "ftp"),
            ("gopher://127.0.0.1:6379/_x", "gopher"),
            ("mailto:someone@example.com", "mailto"),
            ("file:///etc/passwd", "file"),
        ] {
            assert_eq!(
                FileEntry::new(raw, "x").unwrap_err(),
                EntryError::UnsupportedScheme {
                    url: raw.to_string(),
                    scheme: scheme.to_string(),
                }
            );
        }
        assert!(FileEntry::new("HTTPS://example.com/a", "a").is_ok());
    }

    #[test]
    fn empty_zip_path_rejected() {
        let err = FileEntry::new("https://example.com/a", "").unwrap_err();
        assert_eq!(err, EntryError::EmptyZipPath("https://example.com/a".to_string()));
    }
}
