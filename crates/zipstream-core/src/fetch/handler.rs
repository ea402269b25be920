//! Easy2 handler for one streaming GET: records the final status line and
//! buffers body bytes until the reader drains them.

use std::str;

/// Handler state for one transfer. Implements curl's Handler for Easy2.
#[derive(Debug, Default)]
pub struct BodyHandler {
    /// Status of the most recent response (redirect hops overwrite it).
    pub(super) status: Option<u32>,
    pub(super) content_length: Option<u64>,
    /// Bytes received but not yet handed to the reader.
    pub(super) pending: Vec<u8>,
    /// Read offset into `pending`.
    pub(super) consumed: usize,
    /// Total body bytes received for the final response.
    pub(super) received: u64,
}

impl BodyHandler {
    pub(super) fn available(&self) -> usize {
        self.pending.len() - self.consumed
    }

    /// Copy buffered bytes into `out`; returns the count copied.
    pub(super) fn take_into(&mut self, out: &mut [u8]) -> usize {
        let n = self.available().min(out.len());
        out[..n].copy_from_slice(&self.pending[self.consumed..self.consumed + n]);
        self.consumed += n;
        if self.consumed == self.pending.len() {
            self.pending.clear();
            self.consumed = 0;
        }
        n
    }
}

impl curl::easy::Handler for BodyHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            let line = s.trim_end();
            if line.starts_with("HTTP/") {
                self.status = parse_status_line(line);
                self.content_length = None;
            } else if let Some((name, value)) = line.split_once(':') {
                if name.trim().eq_ignore_ascii_case("content-length") {
                    self.content_length = value.trim().parse::<u64>().ok();
                }
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        self.pending.extend_from_slice(data);
        self.received += data.len() as u64;
        Ok(data.len())
    }
}

/// Parse the code out of `HTTP/1.1 200 OK` or `HTTP/2 404`.
fn parse_status_line(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}
