//! Mapping of `reqwest` and gateway failures onto [`TransportError`].

use std::error::Error as _;
use std::io;

use cosmrpc_core::TransportError;
use serde::Deserialize;

/// Error body emitted by the gRPC gateway.
#[derive(Debug, Deserialize)]
struct GatewayError {
    code: u32,
    #[serde(default)]
    message: String,
    #[serde(default)]
    codespace: String,
}

/// Convert a `reqwest` failure into the transport error the classifier
/// expects: dial and read faults keep their phase, decode faults don't.
pub(crate) fn from_reqwest(endpoint: &str, e: reqwest::Error) -> TransportError {
    let endpoint = endpoint.to_string();
    let reason = e.to_string();
    if e.is_timeout() {
        return TransportError::Timeout { endpoint, reason };
    }
    if e.is_connect() {
        return TransportError::Connect { endpoint, reason };
    }
    if e.is_decode() {
        return TransportError::Decode(reason);
    }
    if e.is_body() || e.is_request() {
        return TransportError::Read { endpoint, reason };
    }
    match find_io(&e) {
        Some(kind) => TransportError::Io(io::Error::new(kind, reason)),
        None => TransportError::Other(reason),
    }
}

/// Kind of the first `io::Error` in the source chain.
fn find_io(e: &reqwest::Error) -> Option<io::ErrorKind> {
    let mut source = e.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = err.source();
    }
    None
}

/// Interpret a non-success response: structured gateway errors become
/// [`TransportError::Rpc`], anything else keeps its HTTP status.
///
/// 502/503/504 keep their status even with a structured body; the gateway
/// reports an unavailable node or an expired deadline that way.
pub(crate) fn from_status(status: u16, body: &str) -> TransportError {
    if matches!(status, 502..=504) {
        return TransportError::Http {
            status,
            body: body.trim().to_string(),
        };
    }
    match serde_json::from_str::<GatewayError>(body) {
        Ok(err) => TransportError::Rpc {
            code: err.code,
            codespace: err.codespace,
            message: err.message,
        },
        Err(_) => TransportError::Http {
            status,
            body: body.trim().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use cosmrpc_core::is_transient;

    use super::*;

    #[test]
    fn gateway_body_becomes_rpc_error() {
        let err = from_status(
            404,
            r#"{"code":5,"message":"account neutron1x not found","details":[]}"#,
        );
        match &err {
            TransportError::Rpc { code, message, .. } => {
                assert_eq!(*code, 5);
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.is_not_found());
        assert!(!is_transient(&err));
    }

    #[test]
    fn gateway_panic_is_transient() {
        let err = from_status(500, r#"{"code":2,"message":"recovered: runtime error"}"#);
        assert!(is_transient(&err));
    }

    #[test]
    fn unstructured_body_keeps_status() {
        let err = from_status(503, "<html>Service Unavailable</html>\n");
        match &err {
            TransportError::Http { status, body } => {
                assert_eq!(*status, 503);
                assert_eq!(body, "<html>Service Unavailable</html>");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(is_transient(&err));

        assert!(!is_transient(&from_status(400, "bad request")));
    }

    #[test]
    fn unavailable_and_deadline_bodies_are_transient() {
        let unavailable = from_status(503, r#"{"code":14,"message":"transport is closing"}"#);
        assert!(matches!(unavailable, TransportError::Http { status: 503, .. }));
        assert!(is_transient(&unavailable));

        let deadline = from_status(504, r#"{"code":4,"message":"context deadline exceeded"}"#);
        assert!(matches!(deadline, TransportError::Http { status: 504, .. }));
        assert!(is_transient(&deadline));

        let bad_gateway = from_status(502, r#"{"code":13,"message":"upstream reset"}"#);
        assert!(is_transient(&bad_gateway));
    }
}
