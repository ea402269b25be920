//! Pull-based response body: each `read` drives the curl multi handle just
//! far enough to hand out more bytes.

use std::io::{self, Read};
use std::time::Duration;

use curl::multi::{Easy2Handle, Multi};

use crate::control::{self, CancelToken, ExportCancelled};
use crate::retry::TransportError;

use super::handler::BodyHandler;

/// Upper bound on one `multi.wait` so cancellation is noticed promptly.
const WAIT_SLICE: Duration = Duration::from_millis(100);

/// Body of an in-flight response. Reading it performs the transfer.
pub struct ResponseBody {
    handle: Easy2Handle<BodyHandler>,
    multi: Multi,
    /// Final transfer result once curl reports completion.
    done: Option<Result<(), curl::Error>>,
    cancel: Option<CancelToken>,
}

impl ResponseBody {
    pub(super) fn new(multi: Multi, handle: Easy2Handle<BodyHandler>, cancel: Option<CancelToken>) -> Self {
        Self {
            handle,
            multi,
            done: None,
            cancel,
        }
    }

    pub(super) fn handler(&self) -> &BodyHandler {
        self.handle.get_ref()
    }

    /// True once the final response produced a body byte or the transfer ended.
    pub(super) fn started(&self) -> bool {
        self.done.is_some() || self.handler().received > 0
    }

    /// Transfer failure that happened before any body byte arrived.
    pub(super) fn early_failure(&self) -> Option<curl::Error> {
        match &self.done {
            Some(Err(e)) if self.handler().received == 0 => Some(e.clone()),
            _ => None,
        }
    }

    pub(super) fn is_cancelled(&self) -> bool {
        control::is_cancelled(self.cancel.as_ref())
    }

    /// One step of the multi loop: perform, collect completion, and wait for
    /// socket activity when nothing is buffered yet.
    pub(super) fn pump(&mut self) -> Result<(), TransportError> {
        let running = self.multi.perform()?;

        let mut finished = None;
        let handle = &self.handle;
        self.multi.messages(|msg| {
            if let Some(res) = msg.result_for2(handle) {
                finished = Some(res);
            }
        });
        if let Some(res) = finished {
            self.done = Some(res);
            return Ok(());
        }
        if running == 0 {
            self.done = Some(Ok(()));
            return Ok(());
        }

        if self.handler().available() == 0 {
            self.multi.wait(&mut [], WAIT_SLICE)?;
        }
        Ok(())
    }
}

impl Read for ResponseBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if self.handler().available() > 0 {
                return Ok(self.handle.get_mut().take_into(buf));
            }
            match &self.done {
                Some(Ok(())) => return Ok(0),
                Some(Err(e)) => return Err(io::Error::other(TransportError::Curl(e.clone()))),
                None => {}
            }
            if self.is_cancelled() {
                return Err(io::Error::other(ExportCancelled));
            }
            self.pump().map_err(io::Error::other)?;
        }
    }
}
