//! Fire-and-forget notifications for per-entry failures.
//!
//! The archive builder never waits on a reporter and ignores whatever it
//! does; implementations must not panic or block on slow backends.

use url::Url;

/// Sink for per-entry failure events (exception tracker, metrics, logs).
pub trait Reporter: Send + Sync {
    /// A request never produced a response (retries exhausted).
    fn capture_error(&self, url: &Url, error: &(dyn std::error::Error + 'static));

    /// A request completed with a non-2xx status.
    fn capture_status(&self, url: &Url, status: u32);
}

/// Default reporter: structured `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn capture_error(&self, url: &Url, error: &(dyn std::error::Error + 'static)) {
        tracing::warn!(url = %url, "fetch failed: {}", error);
    }

    fn capture_status(&self, url: &Url, status: u32) {
        tracing::warn!(url = %url, status, "Received status {} for URL {}", status, url);
    }
}
