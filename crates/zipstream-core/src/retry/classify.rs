//! Classify curl failures into retry policy error kinds.

use super::error::TransportError;
use super::policy::ErrorKind;

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a transport error into an ErrorKind.
pub fn classify(e: &TransportError) -> ErrorKind {
    match e {
        TransportError::Curl(ce) => classify_curl_error(ce),
        // A broken multi handle is local state, not the network.
        TransportError::Multi(_)
        | TransportError::Cancelled
        | TransportError::UnsupportedScheme(_) => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failures_are_retryable() {
        // CURLE_COULDNT_RESOLVE_HOST, CURLE_COULDNT_CONNECT, CURLE_GOT_NOTHING
        for code in [6, 7, 52] {
            let e = curl::Error::new(code);
            assert_eq!(classify_curl_error(&e), ErrorKind::Connection, "code {code}");
        }
    }

    #[test]
    fn timeout_is_classified() {
        let e = curl::Error::new(28);
        assert_eq!(classify_curl_error(&e), ErrorKind::Timeout);
    }

    #[test]
    fn setup_errors_are_other() {
        let e = TransportError::Curl(curl::Error::new(1));
        assert_eq!(classify(&e), ErrorKind::Other);
        assert_eq!(classify(&TransportError::Cancelled), ErrorKind::Other);
    }
}
