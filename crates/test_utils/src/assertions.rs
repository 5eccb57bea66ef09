//! Custom Test Assertions
//!
//! Assertion helpers for ledger invariants that give more meaningful
//! failure messages than a bare `assert!`.

use core_kernel::Money;
use domain_billing::{BillingService, InMemoryTransferGateway, TransferPurpose};

/// Asserts that custody equals settled bills minus withdrawals
///
/// # Panics
///
/// Panics with the audit failure if the balance drifted.
pub fn assert_custody_consistent(service: &BillingService) {
    if let Err(e) = service.audit_custody() {
        panic!("Custody out of balance: {}", e);
    }
}

/// Asserts the custody balance in minor units
pub fn assert_custody_balance(service: &BillingService, expected_minor: u128) {
    let balance = service.custody_balance();
    assert_eq!(
        balance.minor_units(),
        expected_minor,
        "Expected custody balance of {} minor units, got {}",
        expected_minor,
        balance
    );
}

/// Asserts that every withdrawal the gateway recorded went to the administrator
/// and that together they match the custody account's withdrawn total
pub fn assert_withdrawals_reached_admin(service: &BillingService, gateway: &InMemoryTransferGateway) {
    let admin = service.administrator();
    let withdrawn = service.custody().total_withdrawn;

    for receipt in gateway.receipts() {
        if receipt.purpose == TransferPurpose::Withdrawal {
            assert_eq!(
                receipt.recipient, admin,
                "Withdrawal {} paid to {} instead of administrator {}",
                receipt.id, receipt.recipient, admin
            );
        }
    }

    assert_eq!(
        gateway.total_paid_to(&admin, TransferPurpose::Withdrawal),
        withdrawn.minor_units(),
        "Gateway withdrawals do not match custody total withdrawn {}",
        withdrawn
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero money, got {}", money);
}
