//! Typed results returned by node queries.

use serde::{Deserialize, Deserializer, Serialize};

/// A token amount in a single denomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(deserialize_with = "de_u128")]
    #[serde(serialize_with = "ser_display")]
    pub amount: u128,
}

impl Coin {
    pub fn new(amount: u128, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl std::fmt::Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// On-chain account identity and ordering counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
    #[serde(default, deserialize_with = "de_u64")]
    pub account_number: u64,
    #[serde(default, deserialize_with = "de_u64")]
    pub sequence: u64,
}

/// Node identity plus latest block, as reported by the status call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    /// Chain id the node belongs to.
    pub network: String,
    pub latest_block_height: u64,
    /// Unix seconds.
    pub latest_block_time: i64,
}

/// Staking module parameters; only the bonded denom is consumed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingParams {
    pub bond_denom: String,
    #[serde(default)]
    pub unbonding_time: String,
    #[serde(default)]
    pub max_validators: u32,
}

/// Header-level view of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub hash: String,
    pub chain_id: String,
    pub height: u64,
    /// Unix seconds.
    pub time: i64,
    /// Raw transactions, base64 as served by the node.
    pub txs: Vec<String>,
}

/// Result of a smart-contract state query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartQueryResponse {
    pub data: serde_json::Value,
}

/// A transaction as reported by broadcast, lookup and search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxResponse {
    #[serde(default, deserialize_with = "de_u64")]
    pub height: u64,
    pub txhash: String,
    #[serde(default)]
    pub codespace: String,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub raw_log: String,
    #[serde(default, deserialize_with = "de_u64")]
    pub gas_wanted: u64,
    #[serde(default, deserialize_with = "de_u64")]
    pub gas_used: u64,
    #[serde(default)]
    pub timestamp: String,
}

impl TxResponse {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

/// Result ordering for transaction search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    #[default]
    Asc,
    Desc,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One page request of an event-filtered transaction search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSearch {
    /// Event filters joined with AND, e.g. `tx.height=100`.
    pub events: Vec<String>,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub order: OrderBy,
    /// Skip entries that fail to parse instead of failing the page.
    pub skip_unparsable: bool,
}

/// One page of transaction search results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxSearchPage {
    pub txs: Vec<TxResponse>,
    pub total_count: u64,
    pub page_total: u64,
    /// Entries dropped because they could not be parsed.
    pub skipped: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrOrNum {
    Str(String),
    Num(u64),
}

/// Cosmos REST encodes 64-bit integers as strings; accept both forms.
pub fn de_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    match StrOrNum::deserialize(d)? {
        StrOrNum::Num(n) => Ok(n),
        StrOrNum::Str(s) if s.is_empty() => Ok(0),
        StrOrNum::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

fn de_u128<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
    match StrOrNum::deserialize(d)? {
        StrOrNum::Num(n) => Ok(n as u128),
        StrOrNum::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

fn ser_display<S: serde::Serializer>(v: &u128, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(v)
}
