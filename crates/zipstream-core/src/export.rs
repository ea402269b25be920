//! End-to-end export: descriptor source in, one ZIP archive out.

use std::sync::Arc;

use thiserror::Error;

use crate::archive::{ArchiveBuilder, ArchiveError, ArchiveSink, ArchiveSummary};
use crate::config::ZipstreamConfig;
use crate::control::CancelToken;
use crate::descriptor::{Descriptor, DescriptorError, EntryProducer, StreamEnd};
use crate::fetch::{CurlOptions, RetryingFetcher};
use crate::report::{Reporter, TracingReporter};

/// Where the first descriptor page comes from.
#[derive(Debug, Clone)]
pub enum DescriptorSource {
    /// First page fetched over HTTP; later pages follow `next` links.
    Url(String),
    /// First page already in memory (request body, file, stdin).
    Payload(Vec<u8>),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Result of a successful export.
#[derive(Debug)]
pub struct ExportSummary {
    pub written: usize,
    pub skipped: usize,
    pub bytes: u64,
    /// How the entry stream ended; `Truncated` means later pages were lost.
    pub stream_end: StreamEnd,
}

/// Wires an [`EntryProducer`] to an [`ArchiveBuilder`] with one shared
/// configuration, reporter and cancel token.
#[derive(Clone)]
pub struct Exporter {
    fetcher: RetryingFetcher,
    config: ZipstreamConfig,
    reporter: Arc<dyn Reporter>,
    cancel: Option<CancelToken>,
}

impl Exporter {
    pub fn new(config: ZipstreamConfig) -> Self {
        let curl = CurlOptions::from(&config.http());
        let fetcher = RetryingFetcher::new(config.retry_policy(), curl);
        Self {
            fetcher,
            config,
            reporter: Arc::new(TracingReporter),
            cancel: None,
        }
    }

    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.fetcher = self.fetcher.with_cancel(token.clone());
        self.cancel = Some(token);
        self
    }

    /// Decode (or fetch and decode) the first page and start the producer.
    /// First-page failures surface here, before any archive byte exists.
    pub fn open(&self, source: &DescriptorSource) -> Result<Descriptor, DescriptorError> {
        let producer = EntryProducer::new(self.fetcher.clone());
        match source {
            DescriptorSource::Url(url) => producer.from_url(url),
            DescriptorSource::Payload(bytes) => producer.from_payload(bytes),
        }
    }

    /// Stream every entry of `descriptor` into `sink`.
    pub fn write<S: ArchiveSink>(
        &self,
        descriptor: Descriptor,
        sink: S,
    ) -> Result<ExportSummary, ExportError> {
        let mut builder = ArchiveBuilder::new(self.fetcher.clone())
            .compression(self.config.compression)
            .reporter(Arc::clone(&self.reporter));
        if let Some(ref token) = self.cancel {
            builder = builder.cancel_token(token.clone());
        }

        let mut entries = descriptor.into_entries();
        let result = builder.stream_all_files(&mut entries, sink);
        let stream_end = entries.finish();

        let ArchiveSummary {
            written,
            skipped,
            bytes,
        } = result?;
        if stream_end.is_truncated() {
            tracing::warn!(written, skipped, "archive complete but descriptor was truncated");
        }
        Ok(ExportSummary {
            written,
            skipped,
            bytes,
            stream_end,
        })
    }
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("fetcher", &self.fetcher)
            .field("config", &self.config)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

/// Options for [`run_export`].
#[derive(Clone)]
pub struct ExportOptions {
    pub config: ZipstreamConfig,
    pub reporter: Arc<dyn Reporter>,
    pub cancel: Option<CancelToken>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            config: ZipstreamConfig::default(),
            reporter: Arc::new(TracingReporter),
            cancel: None,
        }
    }
}

/// Open `source` and stream the whole archive into `sink`.
pub fn run_export<S: ArchiveSink>(
    source: &DescriptorSource,
    sink: S,
    options: ExportOptions,
) -> Result<ExportSummary, ExportError> {
    let mut exporter = Exporter::new(options.config).reporter(options.reporter);
    if let Some(token) = options.cancel {
        exporter = exporter.cancel_token(token);
    }
    let descriptor = exporter.open(source)?;
    exporter.write(descriptor, sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_payload_fails_before_any_output() {
        let mut out = Vec::new();
        let err = run_export(
            &DescriptorSource::Payload(b"{".to_vec()),
            &mut out,
            ExportOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::Descriptor(DescriptorError::Decode(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn empty_descriptor_is_empty_archive() {
        let mut out = Vec::new();
        let err = run_export(
            &DescriptorSource::Payload(br#"{"results":[]}"#.to_vec()),
            &mut out,
            ExportOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::Archive(ArchiveError::EmptyArchive)));
        assert!(out.is_empty());
    }

    #[test]
    fn invalid_first_url_is_reported_up_front() {
        let exporter = Exporter::new(ZipstreamConfig::default());
        let err = exporter
            .open(&DescriptorSource::Url("not a url".into()))
            .unwrap_err();
        assert!(matches!(err, DescriptorError::InvalidLink { .. }));
    }
}
