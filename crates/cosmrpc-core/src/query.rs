//! Typed read operations. Each one hands a single-attempt closure to the
//! retry engine and returns the typed result.

use crate::client::Client;
use crate::error::ClientError;
use crate::types::{
    Account, Block, Coin, NodeStatus, OrderBy, SmartQueryResponse, StakingParams, TxResponse,
    TxSearch, TxSearchPage,
};

/// Page size used when collecting a block's transactions (node max is 100).
pub const BLOCK_TXS_PAGE_LIMIT: u32 = 50;

impl Client {
    /// Look up a transaction by hex hash, without `0x` prefix.
    pub async fn query_tx_by_hash(&self, hash: &str) -> Result<TxResponse, ClientError> {
        self.retry(|rpc| async move { rpc.tx(hash).await }).await
    }

    /// CosmWasm smart query against the latest state. `query` is the raw
    /// JSON message.
    pub async fn query_smart_contract_state(
        &self,
        contract: &str,
        query: &[u8],
    ) -> Result<SmartQueryResponse, ClientError> {
        self.retry(|rpc| async move { rpc.smart_contract_state(contract, query, None).await })
            .await
    }

    /// Smart-contract query against historical state at `height`.
    pub async fn query_smart_contract_state_at(
        &self,
        contract: &str,
        query: &[u8],
        height: u64,
    ) -> Result<SmartQueryResponse, ClientError> {
        self.retry(|rpc| async move {
            rpc.smart_contract_state(contract, query, Some(height)).await
        })
        .await
    }

    /// Staking parameters; `bond_denom` is the chain's bonded token.
    pub async fn query_bonded_denom(&self) -> Result<StakingParams, ClientError> {
        self.retry(|rpc| async move { rpc.staking_params().await }).await
    }

    /// Block header and raw txs at `height`.
    pub async fn query_block(&self, height: u64) -> Result<Block, ClientError> {
        self.retry(|rpc| async move { rpc.block(height).await }).await
    }

    /// Account counters for any address. Vesting accounts are unwrapped to
    /// their base account.
    pub async fn query_account(&self, address: &str) -> Result<Account, ClientError> {
        self.retry(|rpc| async move { rpc.account(address, None).await })
            .await
    }

    /// Account of the configured signing identity.
    pub async fn get_account(&self) -> Result<Account, ClientError> {
        let address = self
            .from_address()
            .ok_or_else(|| ClientError::Config("no from address set".into()))?;
        self.query_account(address).await
    }

    /// Account sequence at `height` (`None` = latest).
    pub async fn get_sequence(&self, height: Option<u64>, address: &str) -> Result<u64, ClientError> {
        let account = self
            .retry(|rpc| async move { rpc.account(address, height).await })
            .await?;
        Ok(account.sequence)
    }

    /// Balance of one denom, optionally at a past height.
    pub async fn query_balance(
        &self,
        address: &str,
        denom: &str,
        height: Option<u64>,
    ) -> Result<Coin, ClientError> {
        self.retry(|rpc| async move { rpc.balance(address, denom, height).await })
            .await
    }

    /// Chain id and latest block of the current node.
    pub async fn node_status(&self) -> Result<NodeStatus, ClientError> {
        self.retry(|rpc| async move { rpc.status().await }).await
    }

    /// Latest block height.
    pub async fn current_block_height(&self) -> Result<u64, ClientError> {
        Ok(self.node_status().await?.latest_block_height)
    }

    /// Latest block height and its unix timestamp.
    pub async fn current_block_and_timestamp(&self) -> Result<(u64, i64), ClientError> {
        let status = self.node_status().await?;
        Ok((status.latest_block_height, status.latest_block_time))
    }

    /// Chain id as reported by the current node.
    pub async fn fetch_chain_id(&self) -> Result<String, ClientError> {
        Ok(self.node_status().await?.network)
    }

    /// One page of an event-filtered transaction search.
    pub async fn get_txs(
        &self,
        events: &[String],
        page: u32,
        limit: u32,
        order: OrderBy,
    ) -> Result<TxSearchPage, ClientError> {
        let search = TxSearch {
            events: events.to_vec(),
            page,
            limit,
            order,
            skip_unparsable: false,
        };
        self.search_txs(&search).await
    }

    /// Like [`get_txs`](Self::get_txs) but drops entries that fail to parse,
    /// returning how many were dropped.
    pub async fn get_txs_with_parse_err_skip(
        &self,
        events: &[String],
        page: u32,
        limit: u32,
        order: OrderBy,
    ) -> Result<(TxSearchPage, u64), ClientError> {
        let search = TxSearch {
            events: events.to_vec(),
            page,
            limit,
            order,
            skip_unparsable: true,
        };
        let page = self.search_txs(&search).await?;
        let skipped = page.skipped;
        Ok((page, skipped))
    }

    /// All transactions included at `height`.
    pub async fn get_block_txs(&self, height: u64) -> Result<Vec<TxResponse>, ClientError> {
        self.collect_txs(vec![format!("tx.height={height}")], false).await
    }

    /// All parseable transactions at `height`; unparseable ones still count
    /// toward the reported total.
    pub async fn get_block_txs_with_parse_err_skip(
        &self,
        height: u64,
    ) -> Result<Vec<TxResponse>, ClientError> {
        self.collect_txs(vec![format!("tx.height={height}")], true).await
    }

    async fn search_txs(&self, search: &TxSearch) -> Result<TxSearchPage, ClientError> {
        self.retry(|rpc| async move { rpc.search_txs(search).await })
            .await
    }

    /// Page through a search until the reported page total is exhausted.
    async fn collect_txs(
        &self,
        events: Vec<String>,
        skip_unparsable: bool,
    ) -> Result<Vec<TxResponse>, ClientError> {
        let mut search = TxSearch {
            events,
            page: 1,
            limit: BLOCK_TXS_PAGE_LIMIT,
            order: OrderBy::Asc,
            skip_unparsable,
        };
        let first = self.search_txs(&search).await?;
        let total = first.total_count;
        let mut skipped = first.skipped;
        let mut txs = first.txs;

        let last_page =
            u32::try_from(first.page_total).map_err(|_| ClientError::PaginationMismatch {
                total,
                accumulated: txs.len() as u64,
                skipped,
            })?;
        for page in 2..=last_page {
            search.page = page;
            let next = self.search_txs(&search).await?;
            skipped += next.skipped;
            txs.extend(next.txs);
        }

        let accumulated = txs.len() as u64;
        let counted = if skip_unparsable { accumulated + skipped } else { accumulated };
        if counted != total {
            return Err(ClientError::PaginationMismatch {
                total,
                accumulated,
                skipped,
            });
        }
        Ok(txs)
    }
}
