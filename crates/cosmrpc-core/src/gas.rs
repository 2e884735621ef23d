//! Decimal gas prices and fee arithmetic.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::ClientError;
use crate::types::Coin;

/// A decimal amount in a single denomination, e.g. `0.005untrn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecCoin {
    pub amount: Decimal,
    pub denom: String,
}

impl std::fmt::Display for DecCoin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for DecCoin {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| invalid(s, "missing denom"))?;
        let (amount, denom) = s.split_at(split);
        if amount.is_empty() {
            return Err(invalid(s, "missing amount"));
        }
        let amount = Decimal::from_str(amount).map_err(|e| invalid(s, &e.to_string()))?;
        if amount.is_sign_negative() {
            return Err(invalid(s, "negative amount"));
        }
        validate_denom(denom).map_err(|reason| invalid(s, reason))?;
        Ok(Self {
            amount,
            denom: denom.to_string(),
        })
    }
}

fn invalid(input: &str, reason: &str) -> ClientError {
    ClientError::Config(format!("invalid decimal coin expression {input:?}: {reason}"))
}

fn validate_denom(denom: &str) -> Result<(), &'static str> {
    let mut chars = denom.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return Err("denom must start with a letter"),
    }
    if !(3..=128).contains(&denom.len()) {
        return Err("denom must be 3 to 128 characters");
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-')) {
        return Err("denom contains invalid characters");
    }
    Ok(())
}

/// Parse a comma-separated list of decimal coins.
pub fn parse_dec_coins(s: &str) -> Result<Vec<DecCoin>, ClientError> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    s.split(',').map(DecCoin::from_str).collect()
}

/// Scale raw simulated gas by `adjustment`, rounding up.
pub fn adjust_gas(simulated: u64, adjustment: f64) -> u64 {
    (simulated as f64 * adjustment).ceil() as u64
}

/// Fee for `gas_limit` at the given prices: `ceil(gas_limit × price)` per denom.
pub fn compute_fee(gas_limit: u64, prices: &[DecCoin]) -> Vec<Coin> {
    prices
        .iter()
        .filter_map(|price| {
            let amount = Decimal::from(gas_limit).checked_mul(price.amount)?.ceil();
            amount.to_u128().map(|a| Coin::new(a, price.denom.clone()))
        })
        .filter(|c| c.amount > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gas_price() {
        let c: DecCoin = "0.005untrn".parse().unwrap();
        assert_eq!(c.amount, Decimal::new(5, 3));
        assert_eq!(c.denom, "untrn");
        assert_eq!(c.to_string(), "0.005untrn");
    }

    #[test]
    fn parses_ibc_denom_list() {
        let coins = parse_dec_coins("1uatom,0.25ibc/27394FB092D2ECCD").unwrap();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins[1].denom, "ibc/27394FB092D2ECCD");
    }

    #[test]
    fn rejects_bad_expressions() {
        for bad in ["untrn", "0.005", "0.005u", "1.2.3uatom", "0.1 1atom"] {
            assert!(bad.parse::<DecCoin>().is_err(), "{bad}");
        }
    }

    #[test]
    fn fee_rounds_up() {
        let prices = parse_dec_coins("0.005untrn").unwrap();
        assert_eq!(compute_fee(150_001, &prices), vec![Coin::new(751, "untrn")]);
        assert!(compute_fee(0, &prices).is_empty());
    }

    #[test]
    fn gas_adjustment_rounds_up() {
        assert_eq!(adjust_gas(100_000, 1.5), 150_000);
        assert_eq!(adjust_gas(3, 1.5), 5);
    }
}
