//! Error types for transports, external capabilities and the client surface.

use thiserror::Error;

/// Errors a single transport attempt against one endpoint can produce.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request timed out (client-side deadline or gateway timeout).
    #[error("request to {endpoint} timed out: {reason}")]
    Timeout { endpoint: String, reason: String },

    /// Connection could not be established.
    #[error("dial {endpoint} failed: {reason}")]
    Connect { endpoint: String, reason: String },

    /// Connection dropped while reading the response.
    #[error("read from {endpoint} failed: {reason}")]
    Read { endpoint: String, reason: String },

    /// Socket-level I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-success HTTP status with an unstructured body.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Structured rejection returned by the node.
    #[error("rpc error {code} ({codespace}): {message}")]
    Rpc {
        code: u32,
        codespace: String,
        message: String,
    },

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// An error annotated with the operation that produced it.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<TransportError>,
    },

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Wrap `self` with a description of the failing operation.
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns `true` if the node reported the requested object as missing
    /// (gRPC `NotFound` or HTTP 404).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Rpc { code, .. } => *code == 5,
            Self::Http { status, .. } => *status == 404,
            Self::Context { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// Failures of the external signing capability.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("key store is locked")]
    Locked,

    #[error("signing failed: {0}")]
    Failed(String),
}

/// Failures of the external transaction codec.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(String),

    #[error("decode failed: {0}")]
    Decode(String),
}

/// Outcome of the retry engine when the operation never succeeded.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The last non-transient failure observed.
    #[error("{0}")]
    Failed(E),

    /// Every outer attempt failed transiently.
    #[error("retry limit reached after {attempts} attempts, last error: {last}")]
    LimitExceeded { attempts: u32, last: E },
}

impl<E> RetryError<E> {
    /// The underlying error, whichever way the retry ended.
    pub fn into_inner(self) -> E {
        match self {
            Self::Failed(e) | Self::LimitExceeded { last: e, .. } => e,
        }
    }
}

/// Errors surfaced by the public client API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad construction or call input.
    #[error("configuration error: {0}")]
    Config(String),

    /// An endpoint could not be dialed at construction.
    #[error("dial endpoint {endpoint}: {source}")]
    Dial {
        endpoint: String,
        #[source]
        source: TransportError,
    },

    /// The signing identity could not be found in the key store.
    #[error("key lookup for {name}: {source}")]
    KeyLookup {
        name: String,
        #[source]
        source: SignerError,
    },

    /// Application-level rejection surfaced after the endpoint sweep.
    #[error(transparent)]
    Rpc(TransportError),

    /// Sustained transient failure exhausted the outer retry bound.
    #[error("retry limit reached after {attempts} attempts: {source}")]
    RetryLimitExceeded {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// Accumulated transaction count disagrees with the reported total.
    #[error("tx count mismatch: total {total}, accumulated {accumulated}, skipped {skipped}")]
    PaginationMismatch {
        total: u64,
        accumulated: u64,
        skipped: u64,
    },

    #[error("resolve account {address}: {source}")]
    AccountResolution {
        address: String,
        #[source]
        source: Box<ClientError>,
    },

    #[error("gas simulation failed: {0}")]
    Simulation(#[source] Box<ClientError>),

    #[error("signing failed: {0}")]
    Signing(#[from] SignerError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The node accepted the bytes but answered with a non-zero code.
    #[error("broadcast rejected with code {code} ({codespace}), txhash {tx_hash}: {raw_log}")]
    BroadcastRejected {
        code: u32,
        codespace: String,
        tx_hash: String,
        raw_log: String,
    },
}

impl ClientError {
    /// Returns `true` for the retry-budget-exhausted case.
    pub fn is_retry_limit(&self) -> bool {
        matches!(self, Self::RetryLimitExceeded { .. })
    }

    /// Tag an account lookup failure: an address unknown to the chain becomes
    /// [`ClientError::AccountResolution`], anything else is returned as is.
    pub(crate) fn into_account_resolution(self, address: &str) -> Self {
        match self {
            Self::Rpc(e) if e.is_not_found() => Self::AccountResolution {
                address: address.to_string(),
                source: Box::new(Self::Rpc(e)),
            },
            other => other,
        }
    }

    /// Transaction hash carried by a rejected broadcast, for diagnostics.
    pub fn tx_hash(&self) -> Option<&str> {
        match self {
            Self::BroadcastRejected { tx_hash, .. } => Some(tx_hash),
            _ => None,
        }
    }
}

impl From<RetryError<TransportError>> for ClientError {
    fn from(e: RetryError<TransportError>) -> Self {
        match e {
            RetryError::Failed(source) => Self::Rpc(source),
            RetryError::LimitExceeded { attempts, last } => Self::RetryLimitExceeded {
                attempts,
                source: last,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_through_context() {
        let e = TransportError::Rpc {
            code: 5,
            codespace: "sdk".into(),
            message: "account not found".into(),
        }
        .context("get account");
        assert!(e.is_not_found());
        assert!(!TransportError::Decode("x".into()).is_not_found());
    }

    #[test]
    fn retry_error_maps_to_client_error() {
        let e: ClientError = RetryError::LimitExceeded {
            attempts: 600,
            last: TransportError::Other("down".into()),
        }
        .into();
        assert!(e.is_retry_limit());

        let e: ClientError = RetryError::Failed(TransportError::Other("bad".into())).into();
        assert!(matches!(e, ClientError::Rpc(_)));
    }

    #[test]
    fn only_unknown_addresses_become_resolution_errors() {
        let missing = ClientError::Rpc(TransportError::Rpc {
            code: 5,
            codespace: "sdk".into(),
            message: "account neutron1x not found".into(),
        });
        assert!(matches!(
            missing.into_account_resolution("neutron1x"),
            ClientError::AccountResolution { .. }
        ));

        let other = ClientError::Rpc(TransportError::Other("invalid address".into()));
        assert!(matches!(other.into_account_resolution("x"), ClientError::Rpc(_)));

        let exhausted = ClientError::RetryLimitExceeded {
            attempts: 3,
            source: TransportError::Other("down".into()),
        };
        assert!(exhausted.into_account_resolution("x").is_retry_limit());
    }

    #[test]
    fn rejected_broadcast_keeps_hash() {
        let e = ClientError::BroadcastRejected {
            code: 5,
            codespace: "wasm".into(),
            tx_hash: "ABCD".into(),
            raw_log: String::new(),
        };
        assert_eq!(e.tx_hash(), Some("ABCD"));
        assert!(e.to_string().contains("code 5 (wasm)"));
    }
}
