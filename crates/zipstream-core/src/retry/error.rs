//! Transport error type for retry classification.

use std::fmt;

/// A request that never produced an HTTP response.
///
/// Status codes are not represented here: a 404 is a completed request and
/// is returned to the caller as a response.
#[derive(Debug)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection, DNS, etc.).
    Curl(curl::Error),
    /// The curl multi handle failed while driving the transfer.
    Multi(curl::MultiError),
    /// The caller's cancel token fired before the response started.
    Cancelled,
    /// The URL's scheme is not `http` or `https`; nothing was sent.
    UnsupportedScheme(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Curl(e) => write!(f, "{}", e),
            TransportError::Multi(e) => write!(f, "curl multi: {}", e),
            TransportError::Cancelled => write!(f, "transfer cancelled"),
            TransportError::UnsupportedScheme(s) => write!(f, "unsupported URL scheme {:?}", s),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Curl(e) => Some(e),
            TransportError::Multi(e) => Some(e),
            TransportError::Cancelled | TransportError::UnsupportedScheme(_) => None,
        }
    }
}

impl From<curl::Error> for TransportError {
    fn from(e: curl::Error) -> Self {
        TransportError::Curl(e)
    }
}

impl From<curl::MultiError> for TransportError {
    fn from(e: curl::MultiError) -> Self {
        TransportError::Multi(e)
    }
}
