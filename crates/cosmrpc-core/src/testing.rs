//! In-memory node and key store used by unit tests.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::client::{Client, Endpoint};
use crate::config::ClientConfig;
use crate::error::{SignerError, TransportError};
use crate::transport::NodeRpc;
use crate::tx::{JsonTxCodec, KeyInfo, PublicKey, Signer};
use crate::types::{
    Account, Block, Coin, NodeStatus, SmartQueryResponse, StakingParams, TxResponse, TxSearch,
    TxSearchPage,
};

#[derive(Debug, Clone)]
pub enum Behavior {
    Healthy,
    Timeout,
    Fail(String),
}

pub struct MockNode {
    pub url: String,
    pub behavior: Mutex<Behavior>,
    pub calls: AtomicU32,
    pub sequence: AtomicU64,
    pub gas_used: u64,
    pub broadcast_code: u32,
    pub total_txs: u64,
    /// Extra count reported in `total_count` but never served.
    pub phantom_txs: u64,
    /// Unparsable entries per page.
    pub skip_per_page: u64,
    pub broadcasts: Mutex<Vec<Vec<u8>>>,
    pub simulations: Mutex<Vec<Vec<u8>>>,
}

impl MockNode {
    pub fn new(url: &str, behavior: Behavior) -> Self {
        Self {
            url: url.to_string(),
            behavior: Mutex::new(behavior),
            calls: AtomicU32::new(0),
            sequence: AtomicU64::new(7),
            gas_used: 100_000,
            broadcast_code: 0,
            total_txs: 0,
            phantom_txs: 0,
            skip_per_page: 0,
            broadcasts: Mutex::new(Vec::new()),
            simulations: Mutex::new(Vec::new()),
        }
    }

    pub fn healthy(url: &str) -> Arc<Self> {
        Arc::new(Self::new(url, Behavior::Healthy))
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.behavior.lock().unwrap() {
            Behavior::Healthy => Ok(()),
            Behavior::Timeout => Err(TransportError::Timeout {
                endpoint: self.url.clone(),
                reason: "deadline exceeded".into(),
            }),
            Behavior::Fail(msg) => Err(TransportError::Rpc {
                code: 13,
                codespace: "sdk".into(),
                message: msg.clone(),
            }),
        }
    }
}

pub fn endpoints(nodes: &[Arc<MockNode>]) -> Vec<Endpoint> {
    nodes.iter().map(|n| n.clone() as Endpoint).collect()
}

pub fn test_config(n: usize) -> ClientConfig {
    let mut config = ClientConfig::new(
        (0..n).map(|i| format!("mock://{i}")).collect(),
        "0.005untrn",
        "neutron",
    );
    config.from_name = Some("relayer".into());
    config.retry_limit = 10;
    config.retry_backoff_ms = 0;
    config
}

/// Signing client over `nodes`, identity "relayer".
pub async fn client_with(nodes: &[Arc<MockNode>]) -> Client {
    Client::new(
        &test_config(nodes.len()),
        endpoints(nodes),
        Some(Arc::new(MockKeyring::default())),
        Arc::new(JsonTxCodec),
    )
    .await
    .ok()
    .unwrap()
}

#[async_trait]
impl NodeRpc for MockNode {
    fn url(&self) -> &str {
        &self.url
    }

    async fn status(&self) -> Result<NodeStatus, TransportError> {
        self.check()?;
        Ok(NodeStatus {
            network: "pion-1".into(),
            latest_block_height: 1_000,
            latest_block_time: 1_700_000_000,
        })
    }

    async fn account(&self, address: &str, _height: Option<u64>) -> Result<Account, TransportError> {
        self.check()?;
        if address == "neutron1ghost" {
            return Err(TransportError::Rpc {
                code: 5,
                codespace: "sdk".into(),
                message: format!("account {address} not found"),
            });
        }
        Ok(Account {
            address: address.to_string(),
            account_number: 42,
            sequence: self.sequence.load(Ordering::SeqCst),
        })
    }

    async fn balance(
        &self,
        _address: &str,
        denom: &str,
        height: Option<u64>,
    ) -> Result<Coin, TransportError> {
        self.check()?;
        Ok(Coin::new(1_000 + height.unwrap_or(0) as u128, denom))
    }

    async fn staking_params(&self) -> Result<StakingParams, TransportError> {
        self.check()?;
        Ok(StakingParams {
            bond_denom: "untrn".into(),
            unbonding_time: "1814400s".into(),
            max_validators: 100,
        })
    }

    async fn smart_contract_state(
        &self,
        contract: &str,
        query: &[u8],
        height: Option<u64>,
    ) -> Result<SmartQueryResponse, TransportError> {
        self.check()?;
        Ok(SmartQueryResponse {
            data: json!({
                "contract": contract,
                "query": String::from_utf8_lossy(query),
                "height": height,
            }),
        })
    }

    async fn block(&self, height: u64) -> Result<Block, TransportError> {
        self.check()?;
        Ok(Block {
            hash: format!("BLOCK{height}"),
            chain_id: "pion-1".into(),
            height,
            time: 1_700_000_000,
            txs: vec![],
        })
    }

    async fn tx(&self, hash: &str) -> Result<TxResponse, TransportError> {
        self.check()?;
        Ok(TxResponse {
            txhash: hash.to_string(),
            height: 10,
            ..TxResponse::default()
        })
    }

    async fn search_txs(&self, search: &TxSearch) -> Result<TxSearchPage, TransportError> {
        self.check()?;
        let limit = u64::from(search.limit);
        let total_count = self.total_txs + self.phantom_txs;
        let page_total = total_count.div_ceil(limit);
        let served_before = (u64::from(search.page) - 1) * limit;
        let count = self.total_txs.saturating_sub(served_before).min(limit);
        let skipped = self.skip_per_page.min(count);
        if skipped > 0 && !search.skip_unparsable {
            return Err(TransportError::Decode("unable to resolve type URL".into()));
        }
        let txs = (0..count - skipped)
            .map(|i| TxResponse {
                txhash: format!("TX{}", served_before + i),
                ..TxResponse::default()
            })
            .collect();
        Ok(TxSearchPage {
            txs,
            total_count,
            page_total,
            skipped,
        })
    }

    async fn simulate(&self, tx_bytes: &[u8]) -> Result<u64, TransportError> {
        self.check()?;
        self.simulations.lock().unwrap().push(tx_bytes.to_vec());
        Ok(self.gas_used)
    }

    async fn broadcast_tx(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        self.check()?;
        self.broadcasts.lock().unwrap().push(tx_bytes.to_vec());
        Ok(TxResponse {
            txhash: "C0FFEE".into(),
            code: self.broadcast_code,
            codespace: if self.broadcast_code == 0 { String::new() } else { "wasm".into() },
            ..TxResponse::default()
        })
    }
}

#[derive(Debug, Default)]
pub struct MockKeyring {
    pub locked: bool,
}

fn relayer_key() -> PublicKey {
    PublicKey {
        type_url: "/cosmos.crypto.secp256k1.PubKey".into(),
        key: vec![2; 33],
    }
}

impl Signer for MockKeyring {
    fn key(&self, name: &str) -> Result<KeyInfo, SignerError> {
        match name {
            "relayer" => Ok(KeyInfo {
                name: name.to_string(),
                address: "neutron1relayer".into(),
                public_key: relayer_key(),
            }),
            "ghost" => Ok(KeyInfo {
                name: name.to_string(),
                address: "neutron1ghost".into(),
                public_key: relayer_key(),
            }),
            _ => Err(SignerError::KeyNotFound(name.to_string())),
        }
    }

    fn sign(&self, name: &str, bytes: &[u8]) -> Result<(Vec<u8>, PublicKey), SignerError> {
        if self.locked {
            return Err(SignerError::Locked);
        }
        let key = self.key(name)?;
        let digest = bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        Ok((vec![digest; 64], key.public_key))
    }
}
