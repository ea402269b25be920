//! Streaming ZIP assembly.
//!
//! [`ArchiveBuilder::stream_all_files`] walks the entries in order. For each
//! one it fetches the URL; a transport failure or non-2xx status is reported
//! and the entry is skipped without leaving a trace in the archive.
//! Otherwise it writes a local header, copies the body verbatim and flushes
//! both the ZIP writer and the sink's transport so the client receives the
//! entry immediately. The writer runs in streaming mode (sizes and CRC go in
//! a data descriptor after each body), so the sink never has to seek.
//!
//! If nothing could be retrieved the central directory is never written and
//! the call fails with [`ArchiveError::EmptyArchive`]. Bytes flushed before
//! that point stay on the wire.

mod error;
mod sink;

pub use error::ArchiveError;
pub use sink::ArchiveSink;

use std::io::{Read, Seek, Write};
use std::sync::Arc;

use url::Url;
use zip::write::SimpleFileOptions;
use zip::{DateTime, ZipWriter};

use crate::config::Compression;
use crate::control::{self, CancelToken};
use crate::entry::FileEntry;
use crate::fetch::{HttpResponse, RetryingFetcher};
use crate::report::{Reporter, TracingReporter};
use crate::retry::TransportError;

use sink::SharedSink;

const COPY_BUF_SIZE: usize = 64 * 1024;

/// Entries at or above this size need ZIP64 fields.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Counters for a finished archive.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Entries written to the archive.
    pub written: usize,
    /// Entries skipped after a failed fetch.
    pub skipped: usize,
    /// Bytes delivered to the sink, container overhead included.
    pub bytes: u64,
}

/// Consumes an entry sequence and writes one ZIP archive to a sink.
#[derive(Clone)]
pub struct ArchiveBuilder {
    fetcher: RetryingFetcher,
    compression: Compression,
    reporter: Arc<dyn Reporter>,
    cancel: Option<CancelToken>,
}

impl ArchiveBuilder {
    pub fn new(fetcher: RetryingFetcher) -> Self {
        Self {
            fetcher,
            compression: Compression::default(),
            reporter: Arc::new(TracingReporter),
            cancel: None,
        }
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Stop between entries and mid-body once `token` fires.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.fetcher = self.fetcher.with_cancel(token.clone());
        self.cancel = Some(token);
        self
    }

    /// Write every retrievable entry of `entries`, in order, as one archive.
    ///
    /// Fails only when no entry could be retrieved, when the sink fails, when
    /// a source breaks mid-body, or on cancellation. In every failure case
    /// the central directory is withheld.
    pub fn stream_all_files<I, S>(&self, entries: I, sink: S) -> Result<ArchiveSummary, ArchiveError>
    where
        I: IntoIterator<Item = FileEntry>,
        S: ArchiveSink,
    {
        let shared = SharedSink::new(sink);
        let mut zip = ZipWriter::new_stream(shared.clone());
        let mut summary = ArchiveSummary::default();

        let outcome = self.write_entries(entries, &mut zip, &shared, &mut summary);
        let outcome = match outcome {
            Ok(()) if summary.written == 0 => Err(ArchiveError::EmptyArchive),
            other => other,
        };
        if let Err(e) = outcome {
            tracing::warn!(skipped = summary.skipped, "archive aborted: {}", e);
            shared.seal();
            drop(zip);
            return Err(e);
        }

        zip.finish()?;
        let mut out = shared.clone();
        out.flush().map_err(ArchiveError::Write)?;
        if let Some(res) = shared.flush_transport() {
            res.map_err(ArchiveError::Write)?;
        }

        summary.bytes = shared.bytes_written();
        tracing::info!(
            written = summary.written,
            skipped = summary.skipped,
            bytes = summary.bytes,
            "archive finalized"
        );
        Ok(summary)
    }

    fn write_entries<I, W, S>(
        &self,
        entries: I,
        zip: &mut ZipWriter<W>,
        shared: &SharedSink<S>,
        summary: &mut ArchiveSummary,
    ) -> Result<(), ArchiveError>
    where
        I: IntoIterator<Item = FileEntry>,
        W: Write + Seek,
        S: ArchiveSink,
    {
        for entry in entries {
            if control::is_cancelled(self.cancel.as_ref()) {
                return Err(ArchiveError::Cancelled);
            }

            let Some(response) = self.fetch_entry(&entry)? else {
                summary.skipped += 1;
                continue;
            };

            let bytes = self.write_entry(zip, &entry, response)?;
            zip.flush().map_err(ArchiveError::Write)?;
            if let Some(res) = shared.flush_transport() {
                res.map_err(ArchiveError::Write)?;
            }
            summary.written += 1;
            tracing::debug!(path = entry.zip_path(), bytes, "entry written");
        }
        // Cancellation can also end the entry sequence early.
        if control::is_cancelled(self.cancel.as_ref()) {
            return Err(ArchiveError::Cancelled);
        }
        Ok(())
    }

    /// `Ok(None)` means the entry is skipped (already reported).
    fn fetch_entry(&self, entry: &FileEntry) -> Result<Option<HttpResponse>, ArchiveError> {
        let response = match self.fetcher.fetch(entry.url()) {
            Ok(r) => r,
            Err(TransportError::Cancelled) => return Err(ArchiveError::Cancelled),
            Err(e) => {
                self.reporter.capture_error(entry.url(), &e);
                return Ok(None);
            }
        };
        if !response.is_success() {
            self.reporter.capture_status(entry.url(), response.status());
            return Ok(None);
        }
        Ok(Some(response))
    }

    fn write_entry<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        entry: &FileEntry,
        response: HttpResponse,
    ) -> Result<u64, ArchiveError> {
        // Unknown length (chunked) might exceed 4 GiB, so it gets ZIP64 fields too.
        let large_file = response
            .content_length()
            .map_or(true, |n| n >= ZIP64_THRESHOLD);
        let options = SimpleFileOptions::default()
            .compression_method(self.compression.into())
            .last_modified_time(DateTime::default_for_write())
            .large_file(large_file);
        zip.start_file(entry.zip_path(), options)?;

        let mut body = response.into_body();
        copy_body(&mut body, zip, entry.url(), self.cancel.as_ref())
    }
}

impl std::fmt::Debug for ArchiveBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveBuilder")
            .field("fetcher", &self.fetcher)
            .field("compression", &self.compression)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

/// Copy `body` into the open archive entry. Read failures and write
/// failures are kept apart: the first blames the source, the second the sink.
fn copy_body<R: Read, W: Write>(
    body: &mut R,
    out: &mut W,
    url: &Url,
    cancel: Option<&CancelToken>,
) -> Result<u64, ArchiveError> {
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut total = 0u64;
    loop {
        if control::is_cancelled(cancel) {
            return Err(ArchiveError::Cancelled);
        }
        let n = match body.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) if control::is_cancelled(cancel) => return Err(ArchiveError::Cancelled),
            Err(source) => {
                return Err(ArchiveError::Body {
                    url: url.clone(),
                    source,
                })
            }
        };
        out.write_all(&buf[..n]).map_err(ArchiveError::Write)?;
        total += n as u64;
    }
}
