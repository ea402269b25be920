//! Retry and backoff policy.
//!
//! Classifies transport failures (timeouts, connection errors) and computes
//! exponential backoff with jitter, so page fetches and file fetches share a
//! single policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error};
pub use error::TransportError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
