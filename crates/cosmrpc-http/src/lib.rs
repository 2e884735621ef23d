//! cosmrpc-http: REST gateway transport for the cosmrpc failover client.
//!
//! [`LcdClient`] implements [`NodeRpc`](cosmrpc_core::NodeRpc) against the
//! Cosmos-SDK gRPC gateway. [`connect`] dials every configured address and
//! builds a ready [`Client`].

mod client;
mod error;
mod wire;

use std::sync::Arc;

use cosmrpc_core::{Client, ClientConfig, ClientError, Endpoint, EndpointPool, Signer, TxCodec};

pub use client::{HttpClientConfig, LcdClient};

/// Dial `config.endpoints` and construct a [`Client`] over them.
pub async fn connect(
    config: &ClientConfig,
    signer: Option<Arc<dyn Signer>>,
    codec: Arc<dyn TxCodec>,
) -> Result<Client, ClientError> {
    let http = HttpClientConfig::from(config);
    let pool = dial(config.endpoints.as_slice(), &http)?;
    Client::from_pool(config, pool, signer, codec).await
}

/// Build an endpoint pool of REST clients, failing on the first bad address.
pub fn dial<A: AsRef<str>>(
    addrs: &[A],
    config: &HttpClientConfig,
) -> Result<EndpointPool<Endpoint>, ClientError> {
    EndpointPool::dial(addrs, |addr| {
        let client = LcdClient::new(addr, config)?;
        tracing::debug!(endpoint = addr, "endpoint dialed");
        Ok(Arc::new(client) as Endpoint)
    })
}

#[cfg(test)]
mod tests {
    use cosmrpc_core::NodeRpc;

    use super::*;

    #[test]
    fn dial_preserves_order() {
        let pool = dial(&["http://a:1317", "https://b:443/"], &HttpClientConfig::default()).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.current().url(), "http://a:1317");
        assert_eq!(pool.rotate().url(), "https://b:443");
    }

    #[test]
    fn bad_address_names_endpoint() {
        let err = dial(&["http://a:1317", "ftp://b"], &HttpClientConfig::default())
            .err()
            .unwrap();
        match err {
            ClientError::Dial { endpoint, .. } => assert_eq!(endpoint, "ftp://b"),
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn empty_list_is_config_error() {
        let none: [&str; 0] = [];
        let err = dial(&none, &HttpClientConfig::default()).err().unwrap();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
