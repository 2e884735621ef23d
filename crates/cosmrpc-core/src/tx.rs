//! Transaction envelopes and the signer / codec capabilities.
//!
//! Message schemas and the signature scheme stay outside this crate: a
//! message is an opaque `type_url` + JSON value, the [`TxCodec`] decides the
//! wire format and the [`Signer`] signs whatever bytes the codec produced.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{CodecError, SignerError};
use crate::types::Coin;

pub const MSG_EXECUTE_CONTRACT: &str = "/cosmwasm.wasm.v1.MsgExecuteContract";
pub const MSG_SEND: &str = "/cosmos.bank.v1beta1.MsgSend";

/// A typed message packed as `type_url` + value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Any {
    pub type_url: String,
    pub value: serde_json::Value,
}

impl Any {
    /// CosmWasm `MsgExecuteContract`.
    pub fn execute_contract(
        sender: &str,
        contract: &str,
        msg: serde_json::Value,
        funds: Vec<Coin>,
    ) -> Self {
        Self {
            type_url: MSG_EXECUTE_CONTRACT.into(),
            value: json!({
                "sender": sender,
                "contract": contract,
                "msg": msg,
                "funds": funds,
            }),
        }
    }

    /// Bank `MsgSend`.
    pub fn bank_send(from: &str, to: &str, amount: Vec<Coin>) -> Self {
        Self {
            type_url: MSG_SEND.into(),
            value: json!({
                "from_address": from,
                "to_address": to,
                "amount": amount,
            }),
        }
    }
}

/// Signature mode recorded in the envelope. Only direct signing is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignMode {
    #[default]
    Direct,
}

/// Public key as returned by the signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub type_url: String,
    pub key: Vec<u8>,
}

/// What the key store knows about a named identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub name: String,
    pub address: String,
    pub public_key: PublicKey,
}

/// Everything that goes into a transaction before it is signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTx {
    pub messages: Vec<Any>,
    pub memo: String,
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
    pub gas_limit: u64,
    pub fee: Vec<Coin>,
    pub sign_mode: SignMode,
}

/// An unsigned transaction with its signature attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTx {
    pub body: UnsignedTx,
    pub public_key: Option<PublicKey>,
    pub signature: Vec<u8>,
}

impl SignedTx {
    /// Envelope for gas simulation: no signature, optional key.
    pub fn for_simulation(body: UnsignedTx, public_key: Option<PublicKey>) -> Self {
        Self {
            body,
            public_key,
            signature: Vec::new(),
        }
    }
}

/// Inputs to [`build_unsigned_tx`].
#[derive(Debug, Clone)]
pub struct TxParams<'a> {
    pub chain_id: &'a str,
    pub account_number: u64,
    pub sequence: u64,
    pub gas_limit: u64,
    pub fee: Vec<Coin>,
    pub sign_mode: SignMode,
    pub memo: &'a str,
}

/// Assemble an unsigned transaction. Pure and deterministic.
pub fn build_unsigned_tx(messages: &[Any], params: TxParams<'_>) -> UnsignedTx {
    UnsignedTx {
        messages: messages.to_vec(),
        memo: params.memo.to_string(),
        chain_id: params.chain_id.to_string(),
        account_number: params.account_number,
        sequence: params.sequence,
        gas_limit: params.gas_limit,
        fee: params.fee,
        sign_mode: params.sign_mode,
    }
}

/// Key store capability.
pub trait Signer: Send + Sync {
    /// Resolve a named identity.
    fn key(&self, name: &str) -> Result<KeyInfo, SignerError>;

    /// Sign `bytes` with the named identity.
    fn sign(&self, name: &str, bytes: &[u8]) -> Result<(Vec<u8>, PublicKey), SignerError>;
}

/// Transaction wire format.
pub trait TxCodec: Send + Sync {
    /// Canonical bytes the signer signs over.
    fn sign_bytes(&self, tx: &UnsignedTx) -> Result<Vec<u8>, CodecError>;

    fn encode(&self, tx: &SignedTx) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<SignedTx, CodecError>;
}

/// serde_json codec; field order is fixed by the struct layout, which keeps
/// sign bytes deterministic.
#[derive(Debug, Default, Clone)]
pub struct JsonTxCodec;

impl TxCodec for JsonTxCodec {
    fn sign_bytes(&self, tx: &UnsignedTx) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(tx).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn encode(&self, tx: &SignedTx) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(tx).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<SignedTx, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
