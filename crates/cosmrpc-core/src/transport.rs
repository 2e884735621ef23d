//! The `NodeRpc` trait: typed calls against a single node endpoint.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{
    Account, Block, Coin, NodeStatus, SmartQueryResponse, StakingParams, TxResponse, TxSearch,
    TxSearchPage,
};

/// One node's RPC surface.
///
/// Implementations perform exactly one attempt per call; retrying and
/// endpoint rotation belong to the retry engine. Heights of `None` mean
/// "latest".
///
/// # Object Safety
/// The trait is object-safe and is stored as `Arc<dyn NodeRpc>` in the pool.
#[async_trait]
pub trait NodeRpc: Send + Sync + 'static {
    /// Return the endpoint's address.
    fn url(&self) -> &str;

    /// Network id plus latest block height and time.
    async fn status(&self) -> Result<NodeStatus, TransportError>;

    async fn account(&self, address: &str, height: Option<u64>) -> Result<Account, TransportError>;

    async fn balance(
        &self,
        address: &str,
        denom: &str,
        height: Option<u64>,
    ) -> Result<Coin, TransportError>;

    async fn staking_params(&self) -> Result<StakingParams, TransportError>;

    async fn smart_contract_state(
        &self,
        contract: &str,
        query: &[u8],
        height: Option<u64>,
    ) -> Result<SmartQueryResponse, TransportError>;

    async fn block(&self, height: u64) -> Result<Block, TransportError>;

    /// Look up a transaction by hex hash (no `0x` prefix).
    async fn tx(&self, hash: &str) -> Result<TxResponse, TransportError>;

    async fn search_txs(&self, search: &TxSearch) -> Result<TxSearchPage, TransportError>;

    /// Dry-run encoded transaction bytes, returning the gas used.
    async fn simulate(&self, tx_bytes: &[u8]) -> Result<u64, TransportError>;

    /// Submit encoded transaction bytes in sync mode.
    async fn broadcast_tx(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError>;
}
