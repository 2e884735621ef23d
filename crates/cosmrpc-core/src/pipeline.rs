//! Transaction construction and broadcast.
//!
//! ```text
//! resolve account ─▶ simulate (retried) ─▶ build unsigned ─▶ sign ─▶ encode ─▶ broadcast (retried)
//! ```
//!
//! The sequence is re-read from the chain on every construction. Nothing is
//! resubmitted after a rejected broadcast; callers decide whether to rebuild.

use crate::client::Client;
use crate::error::ClientError;
use crate::gas::{adjust_gas, compute_fee};
use crate::tx::{build_unsigned_tx, Any, SignMode, SignedTx, TxParams, UnsignedTx};
use crate::types::Coin;

impl Client {
    /// Build, simulate, sign and encode `msgs` for the signing identity.
    pub async fn construct_and_sign_tx(&self, msgs: &[Any]) -> Result<Vec<u8>, ClientError> {
        let from_name = self
            .from_name()
            .ok_or_else(|| ClientError::Config("no from name set".into()))?;
        let address = self.from_address().unwrap_or_default();

        let account = self
            .get_account()
            .await
            .map_err(|e| e.into_account_resolution(address))?;

        let params = |gas_limit: u64| TxParams {
            chain_id: self.chain_id(),
            account_number: account.account_number,
            sequence: account.sequence,
            gas_limit,
            fee: compute_fee(gas_limit, self.gas_prices()),
            sign_mode: SignMode::Direct,
            memo: "",
        };

        let gas_limit = self.calculate_gas(&build_unsigned_tx(msgs, params(0))).await?;
        let unsigned = build_unsigned_tx(msgs, params(gas_limit));

        let sign_bytes = self.codec.sign_bytes(&unsigned)?;
        let (signature, public_key) = self.signer()?.sign(from_name, &sign_bytes)?;
        let signed = SignedTx {
            body: unsigned,
            public_key: Some(public_key),
            signature,
        };
        let tx_bytes = self.codec.encode(&signed)?;

        tracing::debug!(
            from = from_name,
            sequence = account.sequence,
            gas_limit,
            bytes = tx_bytes.len(),
            "transaction signed"
        );
        Ok(tx_bytes)
    }

    /// Simulate `tx` and return the adjusted gas limit.
    pub async fn calculate_gas(&self, tx: &UnsignedTx) -> Result<u64, ClientError> {
        let envelope = SignedTx::for_simulation(tx.clone(), self.from_public_key().cloned());
        let bytes = self.codec.encode(&envelope)?;
        let bytes = bytes.as_slice();

        let simulated = self
            .retry(|rpc| async move { rpc.simulate(bytes).await })
            .await
            .map_err(|e| wrap_unless_exhausted(e, ClientError::Simulation))?;
        Ok(adjust_gas(simulated, self.gas_adjustment))
    }

    /// Submit encoded bytes and interpret the node's response code.
    ///
    /// A non-zero code becomes [`ClientError::BroadcastRejected`], which still
    /// carries the transaction hash.
    pub async fn broadcast_tx(&self, tx: &[u8]) -> Result<String, ClientError> {
        let res = self
            .retry(|rpc| async move { rpc.broadcast_tx(tx).await })
            .await?;
        if res.code != 0 {
            tracing::warn!(
                code = res.code,
                codespace = %res.codespace,
                txhash = %res.txhash,
                "broadcast rejected"
            );
            return Err(ClientError::BroadcastRejected {
                code: res.code,
                codespace: res.codespace,
                tx_hash: res.txhash,
                raw_log: res.raw_log,
            });
        }
        tracing::info!(txhash = %res.txhash, "transaction broadcast");
        Ok(res.txhash)
    }

    /// Execute a CosmWasm contract message from the signing identity.
    pub async fn send_contract_execute(
        &self,
        contract: &str,
        msg: serde_json::Value,
        funds: Vec<Coin>,
    ) -> Result<String, ClientError> {
        let sender = self
            .from_address()
            .ok_or_else(|| ClientError::Config("no from address set".into()))?;
        let msgs = [Any::execute_contract(sender, contract, msg, funds)];
        let tx = self.construct_and_sign_tx(&msgs).await?;
        self.broadcast_tx(&tx).await
    }

    /// Send `amount` from the signing identity to `to`.
    pub async fn single_transfer_to(&self, to: &str, amount: Vec<Coin>) -> Result<String, ClientError> {
        let from = self
            .from_address()
            .ok_or_else(|| ClientError::Config("no from address set".into()))?;
        let msgs = [Any::bank_send(from, to, amount)];
        let tx = self.construct_and_sign_tx(&msgs).await?;
        self.broadcast_tx(&tx).await
    }
}

/// Keep retry exhaustion visible as its own kind; wrap everything else.
fn wrap_unless_exhausted(
    e: ClientError,
    wrap: impl FnOnce(Box<ClientError>) -> ClientError,
) -> ClientError {
    match e {
        e @ ClientError::RetryLimitExceeded { .. } => e,
        other => wrap(Box::new(other)),
    }
}
