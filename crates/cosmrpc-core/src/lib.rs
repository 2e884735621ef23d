//! cosmrpc-core: failover client for clusters of redundant Cosmos nodes.
//!
//! # Overview
//!
//! The core crate is transport-agnostic. It defines:
//!
//! - [`NodeRpc`]: the async trait every node transport implements
//! - [`EndpointPool`]: ordered endpoints with a shared, rotating index
//! - [`policy`] module: the failover retry engine
//! - [`Classify`]: transient vs. business failure classification
//! - [`Client`]: typed queries plus the simulate/sign/broadcast pipeline
//! - [`Signer`] / [`TxCodec`]: external key store and wire codec seams
//!
//! Concrete transports live in sibling crates (`cosmrpc-http`).

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod gas;
pub mod pipeline;
pub mod policy;
pub mod pool;
pub mod query;
pub mod transport;
pub mod tx;
pub mod types;

#[cfg(test)]
mod testing;

pub use classify::{is_transient, Classify};
pub use client::{Client, Endpoint};
pub use config::ClientConfig;
pub use error::{ClientError, CodecError, RetryError, SignerError, TransportError};
pub use gas::DecCoin;
pub use policy::{RetryConfig, RetryEngine};
pub use pool::EndpointPool;
pub use transport::NodeRpc;
pub use tx::{
    build_unsigned_tx, Any, JsonTxCodec, KeyInfo, PublicKey, SignMode, SignedTx, Signer, TxCodec,
    TxParams, UnsignedTx,
};
pub use types::{
    Account, Block, Coin, NodeStatus, OrderBy, SmartQueryResponse, StakingParams, TxResponse,
    TxSearch, TxSearchPage,
};
