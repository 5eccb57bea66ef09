//! Request and response bodies
//!
//! Amounts cross the wire as decimal strings of minor units so that the full
//! `u128` range survives JSON clients that parse numbers as doubles.

pub mod bills;
pub mod custody;
pub mod ledger;
pub mod meters;

use serde::Serialize;

use core_kernel::{Currency, Money};

use crate::error::ApiError;

/// Wire form of an amount
#[derive(Debug, Clone, Serialize)]
pub struct MoneyDto {
    /// Minor units as a decimal string
    pub minor_units: String,
    pub currency: Currency,
    /// Human-readable major-unit value, e.g. `0.0001 ETH`
    pub display: String,
}

impl From<Money> for MoneyDto {
    fn from(money: Money) -> Self {
        Self {
            minor_units: money.minor_units().to_string(),
            currency: money.currency(),
            display: money.to_string(),
        }
    }
}

/// Parses a minor-unit string into an amount of `currency`
pub fn parse_amount(field: &str, raw: &str, currency: Currency) -> Result<Money, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::Validation(format!(
            "{} must be a non-negative integer of minor units",
            field
        )));
    }

    trimmed
        .parse::<u128>()
        .map(|minor| Money::from_minor(minor, currency))
        .map_err(|_| ApiError::Validation(format!("{} is out of range", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        let money = parse_amount("rate", " 1000 ", Currency::ETH).unwrap();
        assert_eq!(money, Money::from_minor(1000, Currency::ETH));

        assert!(parse_amount("rate", "-5", Currency::ETH).is_err());
        assert!(parse_amount("rate", "1.5", Currency::ETH).is_err());
        assert!(parse_amount("rate", "", Currency::ETH).is_err());
        assert!(parse_amount("rate", &"9".repeat(40), Currency::ETH).is_err());
    }

    #[test]
    fn test_money_dto_keeps_full_precision() {
        let dto = MoneyDto::from(Money::from_minor(u128::MAX, Currency::ETH));
        assert_eq!(dto.minor_units, u128::MAX.to_string());
    }
}
