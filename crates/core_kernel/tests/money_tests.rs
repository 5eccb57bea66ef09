//! Unit tests for the Money module
//!
//! Tests cover creation, checked arithmetic, per-unit pricing,
//! currency handling, and major-unit rendering.

use core_kernel::{Money, Currency, MoneyError};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_from_minor_keeps_exact_units() {
        let m = Money::from_minor(100_000, Currency::ETH);
        assert_eq!(m.minor_units(), 100_000);
        assert_eq!(m.currency(), Currency::ETH);
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::EUR);
        assert!(m.is_zero());
        assert_eq!(m.currency(), Currency::EUR);
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_add_same_currency() {
        let a = Money::from_minor(10_000, Currency::USD);
        let b = Money::from_minor(5_000, Currency::USD);
        assert_eq!(a.checked_add(&b).unwrap().minor_units(), 15_000);
    }

    #[test]
    fn test_checked_add_overflow() {
        let a = Money::from_minor(u128::MAX, Currency::USD);
        let b = Money::from_minor(1, Currency::USD);
        assert_eq!(a.checked_add(&b), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_checked_sub_cannot_go_negative() {
        let a = Money::from_minor(3_000, Currency::USD);
        let b = Money::from_minor(10_000, Currency::USD);
        assert_eq!(a.checked_sub(&b), Err(MoneyError::Underflow));
    }

    #[test]
    fn test_checked_sub_currency_mismatch() {
        let a = Money::from_minor(3_000, Currency::USD);
        let b = Money::from_minor(1_000, Currency::GBP);
        assert!(matches!(a.checked_sub(&b), Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_rate_times_reading() {
        // 0.001 ETH per unit, 100 units
        let rate = Money::from_minor(1_000_000_000_000_000, Currency::ETH);
        let amount = rate.checked_mul_units(100).unwrap();
        assert_eq!(amount.minor_units(), 100_000_000_000_000_000);
        assert_eq!(amount.to_decimal().unwrap(), dec!(0.1));
    }

    #[test]
    fn test_mul_by_zero_units() {
        let rate = Money::from_minor(1_000, Currency::USD);
        assert!(rate.checked_mul_units(0).unwrap().is_zero());
    }

    #[test]
    fn test_covers() {
        let bill = Money::from_minor(100, Currency::USD);
        assert!(Money::from_minor(100, Currency::USD).covers(&bill).unwrap());
        assert!(Money::from_minor(150, Currency::USD).covers(&bill).unwrap());
        assert!(!Money::from_minor(99, Currency::USD).covers(&bill).unwrap());
        assert!(Money::from_minor(100, Currency::EUR).covers(&bill).is_err());
    }
}

mod currency {
    use super::*;

    #[test]
    fn test_decimal_places() {
        assert_eq!(Currency::USD.decimal_places(), 2);
        assert_eq!(Currency::JPY.decimal_places(), 0);
        assert_eq!(Currency::ETH.decimal_places(), 18);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("eth".parse::<Currency>().unwrap(), Currency::ETH);
        assert_eq!(" usd ".parse::<Currency>().unwrap(), Currency::USD);
        assert!(matches!("XYZ".parse::<Currency>(), Err(MoneyError::UnknownCurrency(_))));
    }

    #[test]
    fn test_jpy_renders_without_fraction() {
        let m = Money::from_minor(10_000, Currency::JPY);
        assert_eq!(m.to_decimal().unwrap(), dec!(10000));
    }

    #[test]
    fn test_serde_roundtrip_preserves_minor_units() {
        let m = Money::from_minor(123_456_789_012_345_678_901, Currency::ETH);
        let json = serde_json::to_string(&m).unwrap();
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
