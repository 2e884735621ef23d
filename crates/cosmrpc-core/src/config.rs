//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::policy::RetryConfig;

/// Everything needed to construct a [`Client`](crate::Client).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Node addresses, tried in order and rotated through on failure.
    pub endpoints: Vec<String>,
    /// Key store identity used for signing; `None` for a read-only client.
    #[serde(default)]
    pub from_name: Option<String>,
    /// Gas price as decimal coins, e.g. "0.005untrn".
    pub gas_price: String,
    /// Bech32 prefix of account addresses, e.g. "neutron".
    pub account_prefix: String,
    /// Fixed token denomination; the staking bond denom is queried when absent.
    #[serde(default)]
    pub denom: Option<String>,
    /// Multiplier applied to simulated gas.
    #[serde(default = "default_gas_adjustment")]
    pub gas_adjustment: f64,
    /// Outer attempts under sustained transient failure.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
    /// Delay after a transient failure, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Per-request timeout, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_gas_adjustment() -> f64 { 1.5 }
fn default_retry_limit() -> u32 { 600 }
fn default_retry_backoff_ms() -> u64 { 2_000 }
fn default_request_timeout_ms() -> u64 { 30_000 }

impl ClientConfig {
    /// Minimal read-only config for the given endpoints.
    pub fn new(endpoints: Vec<String>, gas_price: impl Into<String>, account_prefix: impl Into<String>) -> Self {
        Self {
            endpoints,
            from_name: None,
            gas_price: gas_price.into(),
            account_prefix: account_prefix.into(),
            denom: None,
            gas_adjustment: default_gas_adjustment(),
            retry_limit: default_retry_limit(),
            retry_backoff_ms: default_retry_backoff_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    /// Parse a JSON config document.
    pub fn from_json(s: &str) -> Result<Self, ClientError> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.endpoints.is_empty() {
            return Err(ClientError::Config("no endpoint".into()));
        }
        if !(self.gas_adjustment.is_finite() && self.gas_adjustment > 0.0) {
            return Err(ClientError::Config(format!(
                "gas adjustment must be positive, got {}",
                self.gas_adjustment
            )));
        }
        Ok(())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            retry_limit: self.retry_limit,
            backoff: Duration::from_millis(self.retry_backoff_ms),
            ..RetryConfig::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in() {
        let c = ClientConfig::from_json(
            r#"{"endpoints":["http://127.0.0.1:1317"],"gas_price":"0.005untrn","account_prefix":"neutron"}"#,
        )
        .unwrap();
        assert_eq!(c.retry_limit, 600);
        assert_eq!(c.retry_config().backoff, Duration::from_secs(2));
        assert_eq!(c.gas_adjustment, 1.5);
        assert!(c.from_name.is_none());
    }

    #[test]
    fn empty_endpoint_list_rejected() {
        let err = ClientConfig::from_json(
            r#"{"endpoints":[],"gas_price":"0.005untrn","account_prefix":"neutron"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no endpoint"));
    }
}
