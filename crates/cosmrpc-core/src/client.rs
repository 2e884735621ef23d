//! The failover client: endpoint pool, retry policy and session state.

use std::future::Future;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{ClientError, SignerError, TransportError};
use crate::gas::{parse_dec_coins, DecCoin};
use crate::policy::{RetryConfig, RetryEngine};
use crate::pool::EndpointPool;
use crate::transport::NodeRpc;
use crate::tx::{KeyInfo, PublicKey, Signer, TxCodec};

/// Shared handle to one node endpoint.
pub type Endpoint = Arc<dyn NodeRpc>;

/// Identity and chain facts cached by the client.
#[derive(Debug, Clone, Default)]
struct Session {
    key: Option<KeyInfo>,
    account_number: u64,
    gas_price: String,
    gas_prices: Vec<DecCoin>,
    denom: String,
    chain_id: String,
    account_prefix: String,
}

/// Client for a cluster of redundant nodes.
///
/// Queries and broadcasts take `&self` and may run concurrently; only the
/// pool's current index is shared mutable state. The cached account number
/// and the sequence read during [`construct_and_sign_tx`](Self::construct_and_sign_tx)
/// are not coordinated across concurrent submissions.
pub struct Client {
    pool: EndpointPool<Endpoint>,
    retry: RetryConfig,
    signer: Option<Arc<dyn Signer>>,
    pub(crate) codec: Arc<dyn TxCodec>,
    pub(crate) gas_adjustment: f64,
    session: Session,
}

impl Client {
    /// Build a client over already-dialed endpoints and resolve chain facts.
    ///
    /// With `config.from_name` set, the identity is looked up in `signer`
    /// and its account number resolved on chain.
    pub async fn new(
        config: &ClientConfig,
        endpoints: Vec<Endpoint>,
        signer: Option<Arc<dyn Signer>>,
        codec: Arc<dyn TxCodec>,
    ) -> Result<Self, ClientError> {
        Self::from_pool(config, EndpointPool::new(endpoints)?, signer, codec).await
    }

    /// Like [`new`](Self::new) over a pool built with [`EndpointPool::dial`].
    pub async fn from_pool(
        config: &ClientConfig,
        pool: EndpointPool<Endpoint>,
        signer: Option<Arc<dyn Signer>>,
        codec: Arc<dyn TxCodec>,
    ) -> Result<Self, ClientError> {
        config.validate()?;
        let gas_prices = parse_dec_coins(&config.gas_price)?;

        let mut client = Self {
            pool,
            retry: config.retry_config(),
            signer,
            codec,
            gas_adjustment: config.gas_adjustment,
            session: Session {
                gas_price: config.gas_price.clone(),
                gas_prices,
                account_prefix: config.account_prefix.clone(),
                ..Session::default()
            },
        };

        client.session.chain_id = client.fetch_chain_id().await?;
        if let Some(name) = &config.from_name {
            client.set_from_name(name).await?;
        }
        client.session.denom = match &config.denom {
            Some(denom) => denom.clone(),
            None => client.query_bonded_denom().await?.bond_denom,
        };

        tracing::info!(
            endpoints = client.pool.len(),
            chain_id = %client.session.chain_id,
            denom = %client.session.denom,
            from = ?client.from_name(),
            "client ready"
        );
        Ok(client)
    }

    /// Run `op` through the retry engine against the current endpoint.
    pub async fn retry<T, F, Fut>(&self, op: F) -> Result<T, ClientError>
    where
        F: FnMut(Endpoint) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        RetryEngine::new(&self.pool, &self.retry)
            .execute(op)
            .await
            .map_err(ClientError::from)
    }

    /// Switch the signing identity and re-resolve its account number.
    ///
    /// The session is only updated once both steps succeed.
    pub async fn set_from_name(&mut self, name: &str) -> Result<(), ClientError> {
        let key = self
            .signer()?
            .key(name)
            .map_err(|source| ClientError::KeyLookup {
                name: name.to_string(),
                source,
            })?;
        let account = self
            .query_account(&key.address)
            .await
            .map_err(|e| e.into_account_resolution(&key.address))?;

        tracing::debug!(
            from = name,
            address = %key.address,
            account_number = account.account_number,
            "signing identity set"
        );
        self.session.account_number = account.account_number;
        self.session.key = Some(key);
        Ok(())
    }

    /// Validate and store a new gas price.
    pub fn set_gas_price(&mut self, gas_price: &str) -> Result<(), ClientError> {
        self.session.gas_prices = parse_dec_coins(gas_price)?;
        self.session.gas_price = gas_price.to_string();
        Ok(())
    }

    /// Gas price as configured, e.g. `0.025untrn`.
    pub fn gas_price(&self) -> &str {
        &self.session.gas_price
    }

    pub(crate) fn gas_prices(&self) -> &[DecCoin] {
        &self.session.gas_prices
    }

    /// Bech32 prefix of account addresses.
    pub fn account_prefix(&self) -> &str {
        &self.session.account_prefix
    }

    /// Replace the account prefix. No validation is performed.
    pub fn set_account_prefix(&mut self, prefix: impl Into<String>) {
        self.session.account_prefix = prefix.into();
    }

    /// Key name of the signing identity, if one is set.
    pub fn from_name(&self) -> Option<&str> {
        self.session.key.as_ref().map(|k| k.name.as_str())
    }

    /// Address of the signing identity.
    pub fn from_address(&self) -> Option<&str> {
        self.session.key.as_ref().map(|k| k.address.as_str())
    }

    pub(crate) fn from_public_key(&self) -> Option<&PublicKey> {
        self.session.key.as_ref().map(|k| &k.public_key)
    }

    /// Account number cached at the last identity change.
    pub fn account_number(&self) -> u64 {
        self.session.account_number
    }

    /// Token denomination used by this chain.
    pub fn denom(&self) -> &str {
        &self.session.denom
    }

    /// Chain id resolved at construction.
    pub fn chain_id(&self) -> &str {
        &self.session.chain_id
    }

    /// Position of the current endpoint in the configured order.
    pub fn current_endpoint_index(&self) -> usize {
        self.pool.current_index()
    }

    /// The endpoint currently in use.
    pub fn current_endpoint(&self) -> Endpoint {
        self.pool.current()
    }

    /// Number of configured endpoints.
    pub fn endpoint_count(&self) -> usize {
        self.pool.len()
    }

    /// Sign raw bytes with a named identity.
    pub fn sign(&self, name: &str, bytes: &[u8]) -> Result<(Vec<u8>, PublicKey), ClientError> {
        Ok(self.signer()?.sign(name, bytes)?)
    }

    pub(crate) fn signer(&self) -> Result<&Arc<dyn Signer>, ClientError> {
        self.signer
            .as_ref()
            .ok_or_else(|| ClientError::Signing(SignerError::Failed("no signer configured".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client_with, endpoints, MockKeyring, MockNode};
    use crate::tx::JsonTxCodec;

    #[tokio::test]
    async fn read_only_client_resolves_chain_facts() {
        let node = MockNode::healthy("a");
        let config = ClientConfig::new(vec!["a".into()], "0.005untrn", "neutron");
        let client = Client::new(&config, endpoints(&[node]), None, Arc::new(JsonTxCodec))
            .await
            .unwrap();
        assert_eq!(client.chain_id(), "pion-1");
        assert_eq!(client.denom(), "untrn");
        assert!(client.from_name().is_none());
        assert_eq!(client.current_endpoint_index(), 0);
    }

    #[tokio::test]
    async fn signing_client_resolves_account_number() {
        let client = client_with(&[MockNode::healthy("a")]).await;
        assert_eq!(client.from_name(), Some("relayer"));
        assert_eq!(client.from_address(), Some("neutron1relayer"));
        assert_eq!(client.account_number(), 42);
    }

    #[tokio::test]
    async fn unknown_key_fails_construction() {
        let mut config = ClientConfig::new(vec!["a".into()], "0.005untrn", "neutron");
        config.from_name = Some("nobody".into());
        config.retry_backoff_ms = 0;
        let err = Client::new(
            &config,
            endpoints(&[MockNode::healthy("a")]),
            Some(Arc::new(MockKeyring::default())),
            Arc::new(JsonTxCodec),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, ClientError::KeyLookup { .. }));
    }

    #[tokio::test]
    async fn failed_identity_switch_keeps_session() {
        let mut client = client_with(&[MockNode::healthy("a")]).await;
        let err = client.set_from_name("ghost").await.unwrap_err();
        assert!(matches!(err, ClientError::AccountResolution { .. }));

        assert_eq!(client.from_name(), Some("relayer"));
        assert_eq!(client.from_address(), Some("neutron1relayer"));
        assert_eq!(client.account_number(), 42);
    }

    #[tokio::test]
    async fn bad_gas_price_rejected() {
        let config = ClientConfig::new(vec!["a".into()], "cheap", "neutron");
        let err = Client::new(&config, endpoints(&[MockNode::healthy("a")]), None, Arc::new(JsonTxCodec))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[tokio::test]
    async fn no_endpoints_rejected() {
        let config = ClientConfig::new(vec![], "0.005untrn", "neutron");
        let err = Client::new(&config, vec![], None, Arc::new(JsonTxCodec))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("no endpoint"));
    }

    #[tokio::test]
    async fn gas_price_update_validates() {
        let mut client = client_with(&[MockNode::healthy("a")]).await;
        assert!(client.set_gas_price("0.01untrn").is_ok());
        assert_eq!(client.gas_price(), "0.01untrn");
        assert!(client.set_gas_price("free").is_err());
        assert_eq!(client.gas_price(), "0.01untrn");
    }
}
