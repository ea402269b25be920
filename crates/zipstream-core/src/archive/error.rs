//! Errors that abort an archive export.

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ArchiveError {
    /// No entry could be retrieved; the archive was never finalized.
    #[error("empty file - all files failed")]
    EmptyArchive,
    /// The destination rejected a write or flush (client gone, disk full).
    #[error("writing archive failed: {0}")]
    Write(#[source] std::io::Error),
    /// A source failed after its bytes started flowing into the archive.
    #[error("reading {url} failed mid-transfer: {source}")]
    Body {
        url: Url,
        #[source]
        source: std::io::Error,
    },
    /// The ZIP writer refused an operation for a reason other than I/O.
    #[error("zip: {0}")]
    Zip(#[source] zip::result::ZipError),
    #[error("export cancelled")]
    Cancelled,
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(io) => ArchiveError::Write(io),
            other => ArchiveError::Zip(other),
        }
    }
}
