//! Cosmos-SDK REST gateway (LCD) client backed by `reqwest`.
//!
//! Every method performs exactly one HTTP round trip (two for `status`).
//! Retrying, rotation and backoff are the core retry engine's job.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use cosmrpc_core::{
    Account, Block, ClientConfig, Coin, NodeRpc, NodeStatus, SmartQueryResponse, StakingParams,
    TransportError, TxResponse, TxSearch, TxSearchPage,
};

use crate::error::{from_reqwest, from_status};
use crate::wire::{
    events_query, order_by, parse_account, parse_search, AccountResponse, BalanceResponse,
    BlockResponse, NodeInfoResponse, ParamsResponse, SimulateResponse, TxBytesRequest, TxEnvelope,
    HEIGHT_HEADER,
};

/// Configuration for `LcdClient`.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("cosmrpc/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl From<&ClientConfig> for HttpClientConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            ..Self::default()
        }
    }
}

/// REST gateway client for one node.
#[derive(Debug, Clone)]
pub struct LcdClient {
    url: String,
    http: reqwest::Client,
}

impl LcdClient {
    /// Create a client for the gateway at `url`.
    ///
    /// Only the address is validated here; no request is sent.
    pub fn new(url: impl Into<String>, config: &HttpClientConfig) -> Result<Self, TransportError> {
        let url = url.into();
        let parsed = reqwest::Url::parse(&url).map_err(|e| TransportError::Connect {
            endpoint: url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportError::Connect {
                endpoint: url,
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| TransportError::Other(format!("build http client: {e}")))?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Create with default configuration.
    pub fn default_for(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(url, &HttpClientConfig::default())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        height: Option<u64>,
    ) -> Result<T, TransportError> {
        let mut req = self.http.get(format!("{}{path}", self.url)).query(query);
        if let Some(h) = height {
            req = req.header(HEIGHT_HEADER, h.to_string());
        }
        tracing::trace!(url = %self.url, path, ?height, "GET");
        self.read(req.send().await).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, TransportError> {
        tracing::trace!(url = %self.url, path, "POST");
        let resp = self
            .http
            .post(format!("{}{path}", self.url))
            .json(body)
            .send()
            .await;
        self.read(resp).await
    }

    async fn read<T: DeserializeOwned>(
        &self,
        resp: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, TransportError> {
        let resp = resp.map_err(|e| from_reqwest(&self.url, e))?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| from_reqwest(&self.url, e))?;

        if !status.is_success() {
            return Err(from_status(status.as_u16(), &String::from_utf8_lossy(&body)));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl NodeRpc for LcdClient {
    fn url(&self) -> &str {
        &self.url
    }

    async fn status(&self) -> Result<NodeStatus, TransportError> {
        let info: NodeInfoResponse = self
            .get("/cosmos/base/tendermint/v1beta1/node_info", &[], None)
            .await
            .map_err(|e| e.context("node info"))?;
        let latest: BlockResponse = self
            .get("/cosmos/base/tendermint/v1beta1/blocks/latest", &[], None)
            .await
            .map_err(|e| e.context("latest block"))?;
        latest.into_status(info.default_node_info.network)
    }

    async fn account(&self, address: &str, height: Option<u64>) -> Result<Account, TransportError> {
        let res: AccountResponse = self
            .get(&format!("/cosmos/auth/v1beta1/accounts/{address}"), &[], height)
            .await?;
        parse_account(&res.account)
    }

    async fn balance(
        &self,
        address: &str,
        denom: &str,
        height: Option<u64>,
    ) -> Result<Coin, TransportError> {
        let res: BalanceResponse = self
            .get(
                &format!("/cosmos/bank/v1beta1/balances/{address}/by_denom"),
                &[("denom", denom.to_string())],
                height,
            )
            .await?;
        Ok(res.balance)
    }

    async fn staking_params(&self) -> Result<StakingParams, TransportError> {
        let res: ParamsResponse = self.get("/cosmos/staking/v1beta1/params", &[], None).await?;
        Ok(res.params)
    }

    async fn smart_contract_state(
        &self,
        contract: &str,
        query: &[u8],
        height: Option<u64>,
    ) -> Result<SmartQueryResponse, TransportError> {
        let path = format!(
            "/cosmwasm/wasm/v1/contract/{contract}/smart/{}",
            URL_SAFE.encode(query)
        );
        self.get(&path, &[], height).await
    }

    async fn block(&self, height: u64) -> Result<Block, TransportError> {
        let res: BlockResponse = self
            .get(&format!("/cosmos/base/tendermint/v1beta1/blocks/{height}"), &[], None)
            .await?;
        res.into_block()
    }

    async fn tx(&self, hash: &str) -> Result<TxResponse, TransportError> {
        let res: TxEnvelope = self
            .get(&format!("/cosmos/tx/v1beta1/txs/{hash}"), &[], None)
            .await?;
        Ok(res.tx_response)
    }

    async fn search_txs(&self, search: &TxSearch) -> Result<TxSearchPage, TransportError> {
        let params = [
            ("query", events_query(&search.events)),
            ("page", search.page.to_string()),
            ("limit", search.limit.to_string()),
            ("order_by", order_by(search.order).to_string()),
        ];
        let body: Value = self.get("/cosmos/tx/v1beta1/txs", &params, None).await?;
        parse_search(&body, search.limit, search.skip_unparsable)
    }

    async fn simulate(&self, tx_bytes: &[u8]) -> Result<u64, TransportError> {
        let res: SimulateResponse = self
            .post("/cosmos/tx/v1beta1/simulate", &TxBytesRequest::simulate(tx_bytes))
            .await?;
        Ok(res.gas_info.gas_used)
    }

    async fn broadcast_tx(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        let res: TxEnvelope = self
            .post("/cosmos/tx/v1beta1/txs", &TxBytesRequest::broadcast_sync(tx_bytes))
            .await?;
        Ok(res.tx_response)
    }
}
