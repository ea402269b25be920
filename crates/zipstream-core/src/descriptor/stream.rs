//! The entry stream: a pull-based iterator fed by the producer thread
//! through a zero-capacity rendezvous channel.

use std::sync::mpsc::{Receiver, SyncSender};
use std::thread::JoinHandle;

use crate::control::CancelToken;
use crate::entry::FileEntry;

use super::error::DescriptorError;

/// How the entry stream ended.
#[derive(Debug)]
pub enum StreamEnd {
    /// The last page had no `next` link.
    Exhausted,
    /// A follow-up page could not be fetched or decoded. Entries already
    /// produced stand; nothing after the failing page was produced.
    Truncated(DescriptorError),
    /// The consumer stopped pulling (or the export was cancelled) before
    /// pagination ended.
    Abandoned,
}

impl StreamEnd {
    pub fn is_truncated(&self) -> bool {
        matches!(self, StreamEnd::Truncated(_))
    }
}

/// Producer half, owned by the producer thread.
pub(super) struct EntrySender {
    tx: SyncSender<FileEntry>,
}

impl EntrySender {
    /// Hand one entry over; blocks until the consumer takes it. Returns
    /// false once the consumer has gone away.
    pub(super) fn send(&self, entry: FileEntry) -> bool {
        self.tx.send(entry).is_ok()
    }
}

/// Ordered, single-pass sequence of entries. Iterating blocks until the
/// producer supplies the next entry or closes the stream; after it closes,
/// [`EntryStream::end`] tells a normal end from a truncated one.
pub struct EntryStream {
    rx: Option<Receiver<FileEntry>>,
    producer: Option<JoinHandle<StreamEnd>>,
    /// Cancels the producer's in-flight page fetch on close.
    stop: CancelToken,
    end: Option<StreamEnd>,
}

impl EntryStream {
    /// Create a connected (sender, stream) pair. `sync_channel(0)` has no
    /// buffer: every send waits for a matching receive.
    pub(super) fn channel() -> (EntrySender, Receiver<FileEntry>) {
        let (tx, rx) = std::sync::mpsc::sync_channel(0);
        (EntrySender { tx }, rx)
    }

    pub(super) fn new(rx: Receiver<FileEntry>, producer: JoinHandle<StreamEnd>, stop: CancelToken) -> Self {
        Self {
            rx: Some(rx),
            producer: Some(producer),
            stop,
            end: None,
        }
    }

    /// Terminal state, once the stream has closed.
    pub fn end(&self) -> Option<&StreamEnd> {
        self.end.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.rx.is_none()
    }

    /// Close the stream and return the terminal state. A producer still
    /// running is stopped promptly: a page fetch in flight is cancelled and a
    /// pending hand-off fails.
    pub fn finish(mut self) -> StreamEnd {
        self.close();
        self.end.take().unwrap_or(StreamEnd::Abandoned)
    }

    fn close(&mut self) {
        // Both must happen before the join: one unblocks a producer parked in
        // send(), the other one stuck in a slow page fetch.
        if self.rx.take().is_some() && self.producer.is_some() {
            self.stop.cancel();
        }
        if let Some(handle) = self.producer.take() {
            let end = handle
                .join()
                .unwrap_or(StreamEnd::Truncated(DescriptorError::ProducerPanicked));
            match &end {
                StreamEnd::Exhausted => tracing::debug!("entry stream exhausted"),
                StreamEnd::Truncated(e) => tracing::warn!("entry stream truncated: {}", e),
                StreamEnd::Abandoned => tracing::debug!("entry stream abandoned by consumer"),
            }
            self.end = Some(end);
        }
    }
}

impl Iterator for EntryStream {
    type Item = FileEntry;

    fn next(&mut self) -> Option<FileEntry> {
        let rx = self.rx.as_ref()?;
        match rx.recv() {
            Ok(entry) => Some(entry),
            Err(_) => {
                self.close();
                None
            }
        }
    }
}

impl std::fmt::Debug for EntryStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStream")
            .field("closed", &self.is_closed())
            .field("end", &self.end)
            .finish()
    }
}
