//! Transient-vs-business error classification.
//!
//! Any error type that wants to flow through the retry engine implements
//! [`Classify`]. The classifier walks the cause chain through that trait:
//!
//! 1. timeout / temporary condition → transient
//! 2. socket error in the dial or read phase (incl. refused) → transient
//! 3. an underlying cause exists → classify the cause instead
//! 4. message mentions a mid-shutdown empty body, a recovered panic or a
//!    generic internal server error → transient
//! 5. anything else → business fault

use std::io;

use crate::error::TransportError;

/// Substrings that mark a node-side fault even when no structured error
/// type is available.
const TRANSIENT_MARKERS: &[&str] = &[
    // empty/truncated body while the node is shutting down
    "looking for beginning of value",
    "expected value at line 1 column 1",
    "EOF while parsing",
    // server task panic
    "recovered",
    "panic",
    "Internal server error",
];

/// Capability exposed by every error the retry engine can inspect.
pub trait Classify {
    /// Timeout or explicitly temporary condition.
    fn is_timeout_or_temporary(&self) -> bool {
        false
    }

    /// Socket error raised while dialing or reading (as opposed to decoding).
    fn is_connection_phase(&self) -> bool {
        false
    }

    /// The underlying cause, if this error wraps another classifiable one.
    fn cause(&self) -> Option<&dyn Classify> {
        None
    }

    /// Human-readable message used by the substring fallback.
    fn message(&self) -> String;
}

/// Returns `true` if `err` is a connectivity fault worth rotating and retrying.
pub fn is_transient(err: &dyn Classify) -> bool {
    if err.is_timeout_or_temporary() || err.is_connection_phase() {
        return true;
    }
    if let Some(cause) = err.cause() {
        return is_transient(cause);
    }
    let msg = err.message();
    TRANSIENT_MARKERS.iter().any(|m| msg.contains(m))
}

impl Classify for io::Error {
    fn is_timeout_or_temporary(&self) -> bool {
        matches!(
            self.kind(),
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
        )
    }

    fn is_connection_phase(&self) -> bool {
        matches!(
            self.kind(),
            io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::NotConnected
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::UnexpectedEof
        )
    }

    fn message(&self) -> String {
        self.to_string()
    }
}

impl Classify for TransportError {
    fn is_timeout_or_temporary(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            // gateway in front of a restarting node
            Self::Http { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    fn is_connection_phase(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Read { .. })
    }

    fn cause(&self) -> Option<&dyn Classify> {
        match self {
            Self::Io(e) => Some(e as &dyn Classify),
            Self::Context { source, .. } => Some(source.as_ref() as &dyn Classify),
            _ => None,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
