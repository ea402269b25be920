//! Errors raised while obtaining descriptor pages.

use thiserror::Error;
use url::Url;

use crate::retry::TransportError;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("invalid descriptor link {link:?}: {source}")]
    InvalidLink {
        link: String,
        #[source]
        source: url::ParseError,
    },
    #[error("fetching descriptor page {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: TransportError,
    },
    #[error("descriptor page {url} returned HTTP {status}")]
    Status { url: Url, status: u32 },
    #[error("reading descriptor page {url} failed: {source}")]
    Read {
        url: Url,
        #[source]
        source: std::io::Error,
    },
    #[error("descriptor page {url} exceeds {limit} bytes")]
    TooLarge { url: Url, limit: u64 },
    #[error("invalid descriptor JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid descriptor JSON at {url}: {source}")]
    DecodePage {
        url: Url,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to start descriptor producer: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("descriptor producer panicked")]
    ProducerPanicked,
}
