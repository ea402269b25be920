//! Descriptor decoding and the entry producer.
//!
//! A descriptor is a JSON document listing `(url, zipPath)` records, possibly
//! split over pages linked by `next`. [`EntryProducer`] decodes the first
//! page synchronously (so a malformed payload is reported to the caller
//! up front), then hands the rest of the work to a producer thread that
//! emits entries one at a time and walks `next` links as the consumer pulls.
//!
//! A follow-up page that cannot be fetched or decoded ends the stream early.
//! Consumers see the same end-of-iteration as a normal end; the distinction
//! is kept in [`StreamEnd`].

mod error;
mod page;
mod stream;

pub use error::DescriptorError;
pub use page::{DescriptorPage, RawEntry};
pub use stream::{EntryStream, StreamEnd};

use std::io::Read;

use url::Url;

use crate::control::CancelToken;
use crate::fetch::RetryingFetcher;
use crate::filename::escape_suggested_filename;

use stream::EntrySender;

/// Upper bound for one descriptor page body.
pub const MAX_PAGE_BYTES: u64 = 64 * 1024 * 1024;

/// A decoded descriptor: archive metadata plus the lazily produced entries.
#[derive(Debug)]
pub struct Descriptor {
    suggested_filename: String,
    entries: EntryStream,
}

impl Descriptor {
    /// Raw suggested filename as captured from the first page (may be empty).
    pub fn suggested_filename_raw(&self) -> &str {
        &self.suggested_filename
    }

    /// Override the suggested filename (e.g. from a request parameter).
    pub fn with_suggested_filename(mut self, raw: impl Into<String>) -> Self {
        self.suggested_filename = raw.into();
        self
    }

    /// Header-safe filename, computed on demand.
    pub fn escaped_suggested_filename(&self) -> String {
        escape_suggested_filename(&self.suggested_filename)
    }

    pub fn entries(&mut self) -> &mut EntryStream {
        &mut self.entries
    }

    pub fn into_entries(self) -> EntryStream {
        self.entries
    }
}

/// Turns a descriptor payload into an [`EntryStream`].
#[derive(Debug, Clone, Default)]
pub struct EntryProducer {
    fetcher: RetryingFetcher,
}

impl EntryProducer {
    /// `fetcher` is used for every `next` link (and the first page for
    /// [`EntryProducer::from_url`]).
    pub fn new(fetcher: RetryingFetcher) -> Self {
        Self { fetcher }
    }

    /// Decode an in-memory first page and start producing.
    pub fn from_payload(&self, payload: &[u8]) -> Result<Descriptor, DescriptorError> {
        let first = DescriptorPage::from_json(payload).map_err(DescriptorError::Decode)?;
        self.start(first)
    }

    /// Fetch and decode the first page from `url`, then start producing.
    /// Failures on this first page are returned, not swallowed.
    pub fn from_url(&self, url: &str) -> Result<Descriptor, DescriptorError> {
        let first = fetch_page(&self.fetcher, url)?;
        self.start(first)
    }

    fn start(&self, first: DescriptorPage) -> Result<Descriptor, DescriptorError> {
        let suggested_filename = first.suggested_filename().unwrap_or_default().to_string();
        let (tx, rx) = EntryStream::channel();
        // Fires when the export is cancelled or the consumer closes the stream.
        let stop = match self.fetcher.cancel_token() {
            Some(token) => token.child(),
            None => CancelToken::new(),
        };
        let fetcher = self.fetcher.clone().with_cancel(stop.clone());
        let producer_stop = stop.clone();
        let producer = std::thread::Builder::new()
            .name("zipstream-producer".to_string())
            .spawn(move || produce(first, &fetcher, tx, &producer_stop))
            .map_err(DescriptorError::Spawn)?;
        Ok(Descriptor {
            suggested_filename,
            entries: EntryStream::new(rx, producer, stop),
        })
    }
}

/// Producer loop: emit each page's entries in order, then follow `next`.
fn produce(first: DescriptorPage, fetcher: &RetryingFetcher, tx: EntrySender, stop: &CancelToken) -> StreamEnd {
    let mut page = first;
    let mut page_no = 1u32;
    loop {
        let (raw_entries, next) = page.into_parts();
        tracing::debug!(page = page_no, entries = raw_entries.len(), "producing descriptor page");
        for raw in &raw_entries {
            if let Some(entry) = raw.to_file_entry() {
                if !tx.send(entry) {
                    return StreamEnd::Abandoned;
                }
            }
        }

        let Some(next) = next else {
            return StreamEnd::Exhausted;
        };
        page_no += 1;
        page = match fetch_page(fetcher, &next) {
            Ok(p) => p,
            Err(_) if stop.is_cancelled() => return StreamEnd::Abandoned,
            Err(e) => return StreamEnd::Truncated(e),
        };
    }
}

/// GET one descriptor page and decode it. Non-2xx is an error here: a
/// page body that is not a descriptor cannot be used.
pub fn fetch_page(fetcher: &RetryingFetcher, link: &str) -> Result<DescriptorPage, DescriptorError> {
    let url = Url::parse(link).map_err(|source| DescriptorError::InvalidLink {
        link: link.to_string(),
        source,
    })?;
    let response = fetcher
        .fetch(&url)
        .map_err(|source| DescriptorError::Transport {
            url: url.clone(),
            source,
        })?;
    if !response.is_success() {
        return Err(DescriptorError::Status {
            url,
            status: response.status(),
        });
    }

    let mut body = Vec::new();
    response
        .into_body()
        .take(MAX_PAGE_BYTES + 1)
        .read_to_end(&mut body)
        .map_err(|source| DescriptorError::Read {
            url: url.clone(),
            source,
        })?;
    if body.len() as u64 > MAX_PAGE_BYTES {
        return Err(DescriptorError::TooLarge {
            url,
            limit: MAX_PAGE_BYTES,
        });
    }
    DescriptorPage::from_json(&body).map_err(|source| DescriptorError::DecodePage { url, source })
}
