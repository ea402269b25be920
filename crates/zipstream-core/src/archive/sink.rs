//! Output sinks for the archive byte stream.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::rc::Rc;

/// Destination of the archive bytes (an HTTP response body, a file, stdout).
///
/// `Write::flush` empties in-process buffers. `flush_transport` is the
/// optional extra step that pushes bytes out to the client; sinks that have
/// no such step keep the default and return `None`.
pub trait ArchiveSink: Write {
    fn flush_transport(&mut self) -> Option<io::Result<()>> {
        None
    }
}

impl ArchiveSink for Vec<u8> {}

impl ArchiveSink for File {}

impl ArchiveSink for io::Cursor<Vec<u8>> {}

impl ArchiveSink for io::Stdout {
    fn flush_transport(&mut self) -> Option<io::Result<()>> {
        Some(self.flush())
    }
}

impl<W: Write> ArchiveSink for BufWriter<W> {
    fn flush_transport(&mut self) -> Option<io::Result<()>> {
        Some(self.flush())
    }
}

impl<S: ArchiveSink + ?Sized> ArchiveSink for &mut S {
    fn flush_transport(&mut self) -> Option<io::Result<()>> {
        (**self).flush_transport()
    }
}

impl<S: ArchiveSink + ?Sized> ArchiveSink for Box<S> {
    fn flush_transport(&mut self) -> Option<io::Result<()>> {
        (**self).flush_transport()
    }
}

struct SinkState<S> {
    sink: S,
    bytes: u64,
    sealed: bool,
}

/// Handle shared between the ZIP writer (which owns one clone) and the
/// builder (which flushes and seals through another). Both live on the
/// consumer thread.
///
/// Once sealed, writes are discarded: nothing more reaches the client, in
/// particular not the central directory the ZIP writer emits when dropped.
pub(super) struct SharedSink<S> {
    state: Rc<RefCell<SinkState<S>>>,
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<S: ArchiveSink> SharedSink<S> {
    pub(super) fn new(sink: S) -> Self {
        Self {
            state: Rc::new(RefCell::new(SinkState {
                sink,
                bytes: 0,
                sealed: false,
            })),
        }
    }

    pub(super) fn flush_transport(&self) -> Option<io::Result<()>> {
        let mut st = self.state.borrow_mut();
        if st.sealed {
            return None;
        }
        st.sink.flush_transport()
    }

    pub(super) fn seal(&self) {
        self.state.borrow_mut().sealed = true;
    }

    pub(super) fn bytes_written(&self) -> u64 {
        self.state.borrow().bytes
    }
}

impl<S: ArchiveSink> Write for SharedSink<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut st = self.state.borrow_mut();
        if st.sealed {
            return Ok(buf.len());
        }
        let n = st.sink.write(buf)?;
        st.bytes += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut st = self.state.borrow_mut();
        if st.sealed {
            return Ok(());
        }
        st.sink.flush()
    }
}
