//! Export cancellation: a shared abort token checked by the archive loop.
//!
//! The front end (e.g. a Ctrl-C handler or a server noticing a dropped
//! client) holds one clone and calls [`CancelToken::cancel`]; the builder and
//! the body reader hold the others and stop at their next check.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Error returned when an export is stopped by its caller.
#[derive(Debug)]
pub struct ExportCancelled;

impl std::fmt::Display for ExportCancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "export cancelled")
    }
}

impl std::error::Error for ExportCancelled {}

/// Cloneable abort flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    parent: Option<Arc<CancelToken>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that fires when `self` fires, but can also be cancelled on
    /// its own without touching `self`.
    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            parent: Some(Arc::new(self.clone())),
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self.parent.as_ref().is_some_and(|p| p.is_cancelled())
    }
}

/// True when `token` is present and has fired.
pub(crate) fn is_cancelled(token: Option<&CancelToken>) -> bool {
    token.map(CancelToken::is_cancelled).unwrap_or(false)
}
