//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating ledger inputs that stay
//! clear of arithmetic overflow unless a test asks otherwise.

use core_kernel::{Currency, Money};
use proptest::prelude::*;

/// Strategy for generating ledger currencies
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::JPY),
        Just(Currency::INR),
        Just(Currency::ETH),
    ]
}

/// Strategy for per-unit rates in wei
pub fn rate_strategy() -> impl Strategy<Value = Money> {
    (0u128..1_000_000_000_000u128).prop_map(|minor| Money::from_minor(minor, Currency::ETH))
}

/// Strategy for meter readings
pub fn reading_strategy() -> impl Strategy<Value = u64> {
    0u64..10_000_000u64
}

/// Strategy for non-blank meter type labels
pub fn meter_type_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("electricity".to_string()),
        Just("water".to_string()),
        Just("gas".to_string()),
        "[a-z][a-z_]{0,30}",
    ]
}

/// One step of a random ledger workload
#[derive(Debug, Clone)]
pub enum LedgerAction {
    /// Issue a bill on the meter at this position (modulo meter count)
    Bill { meter: usize, reading: u64 },
    /// Pay the bill at this position with `extra` over the amount
    Pay { meter: usize, bill: usize, extra: u128 },
    /// Pay the bill at this position with `short` under the amount
    Underpay { meter: usize, bill: usize, short: u128 },
    /// Toggle the meter's active flag
    Toggle { meter: usize },
    /// Withdraw custody
    Withdraw,
}

/// Strategy for random ledger workloads
pub fn ledger_action_strategy() -> impl Strategy<Value = LedgerAction> {
    prop_oneof![
        3 => (0usize..4, 0u64..10_000).prop_map(|(meter, reading)| LedgerAction::Bill { meter, reading }),
        3 => (0usize..4, 0usize..8, 0u128..1_000).prop_map(|(meter, bill, extra)| LedgerAction::Pay { meter, bill, extra }),
        1 => (0usize..4, 0usize..8, 1u128..1_000).prop_map(|(meter, bill, short)| LedgerAction::Underpay { meter, bill, short }),
        1 => (0usize..4).prop_map(|meter| LedgerAction::Toggle { meter }),
        1 => Just(LedgerAction::Withdraw),
    ]
}
