//! REST gateway response shapes and their conversion into core types.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::DateTime;
use cosmrpc_core::types::de_u64;
use cosmrpc_core::{Account, Block, NodeStatus, OrderBy, TransportError, TxResponse, TxSearchPage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header selecting the state height of a query.
pub(crate) const HEIGHT_HEADER: &str = "x-cosmos-block-height";

#[derive(Debug, Deserialize)]
pub(crate) struct AccountResponse {
    pub account: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BalanceResponse {
    pub balance: cosmrpc_core::Coin,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParamsResponse {
    pub params: cosmrpc_core::StakingParams,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeInfoResponse {
    pub default_node_info: NodeInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeInfo {
    pub network: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlockResponse {
    #[serde(default)]
    block_id: BlockId,
    block: RawBlock,
}

#[derive(Debug, Default, Deserialize)]
struct BlockId {
    #[serde(default)]
    hash: String,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    header: Header,
    #[serde(default)]
    data: BlockData,
}

#[derive(Debug, Deserialize)]
struct Header {
    chain_id: String,
    #[serde(deserialize_with = "de_u64")]
    height: u64,
    time: String,
}

#[derive(Debug, Default, Deserialize)]
struct BlockData {
    #[serde(default)]
    txs: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TxEnvelope {
    pub tx_response: TxResponse,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SimulateResponse {
    pub gas_info: GasInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GasInfo {
    #[serde(deserialize_with = "de_u64")]
    pub gas_used: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct TxBytesRequest<'a> {
    pub tx_bytes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'a str>,
}

impl<'a> TxBytesRequest<'a> {
    pub fn simulate(tx: &[u8]) -> Self {
        Self {
            tx_bytes: STANDARD.encode(tx),
            mode: None,
        }
    }

    pub fn broadcast_sync(tx: &[u8]) -> Self {
        Self {
            tx_bytes: STANDARD.encode(tx),
            mode: Some("BROADCAST_MODE_SYNC"),
        }
    }
}

/// Unwrap vesting and module account nesting down to the base account.
pub(crate) fn parse_account(account: &Value) -> Result<Account, TransportError> {
    let mut current = account;
    for _ in 0..4 {
        if current.get("address").is_some() {
            return Ok(serde_json::from_value(current.clone())?);
        }
        current = match current
            .get("base_account")
            .or_else(|| current.get("base_vesting_account"))
        {
            Some(inner) => inner,
            None => break,
        };
    }
    Err(TransportError::Decode(format!(
        "unsupported account type {}",
        account.get("@type").and_then(Value::as_str).unwrap_or("unknown")
    )))
}

/// Convert an RFC 3339 block time into unix seconds.
pub(crate) fn parse_time(time: &str) -> Result<i64, TransportError> {
    DateTime::parse_from_rfc3339(time)
        .map(|t| t.timestamp())
        .map_err(|e| TransportError::Decode(format!("block time {time:?}: {e}")))
}

impl BlockResponse {
    pub fn into_block(self) -> Result<Block, TransportError> {
        let hash = STANDARD
            .decode(&self.block_id.hash)
            .map_err(|e| TransportError::Decode(format!("block hash: {e}")))?;
        Ok(Block {
            hash: hash.iter().map(|b| format!("{b:02X}")).collect(),
            chain_id: self.block.header.chain_id,
            height: self.block.header.height,
            time: parse_time(&self.block.header.time)?,
            txs: self.block.data.txs,
        })
    }

    pub fn into_status(self, network: String) -> Result<NodeStatus, TransportError> {
        Ok(NodeStatus {
            network,
            latest_block_height: self.block.header.height,
            latest_block_time: parse_time(&self.block.header.time)?,
        })
    }
}

pub(crate) fn order_by(order: OrderBy) -> &'static str {
    match order {
        OrderBy::Asc => "ORDER_BY_ASC",
        OrderBy::Desc => "ORDER_BY_DESC",
    }
}

/// Event filters in the gateway's query syntax.
pub(crate) fn events_query(events: &[String]) -> String {
    events.join(" AND ")
}

/// Decode one search page. Entries that do not parse fail the page unless
/// `skip_unparsable` is set, in which case they are counted and dropped.
pub(crate) fn parse_search(
    body: &Value,
    limit: u32,
    skip_unparsable: bool,
) -> Result<TxSearchPage, TransportError> {
    let entries = body
        .get("tx_responses")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut page = TxSearchPage::default();
    for entry in entries {
        match serde_json::from_value::<TxResponse>(entry.clone()) {
            Ok(tx) => page.txs.push(tx),
            Err(e) if skip_unparsable => {
                tracing::debug!(error = %e, "skipping unparsable transaction");
                page.skipped += 1;
            }
            Err(e) => return Err(TransportError::Decode(format!("transaction: {e}"))),
        }
    }

    page.total_count = body
        .get("total")
        .filter(|v| !v.is_null())
        .or_else(|| body.pointer("/pagination/total"))
        .map(count)
        .transpose()?
        .unwrap_or(entries.len() as u64);
    page.page_total = page.total_count.div_ceil(u64::from(limit.max(1)));
    Ok(page)
}

fn count(v: &Value) -> Result<u64, TransportError> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| TransportError::Decode(format!("invalid total {v}")))
}
