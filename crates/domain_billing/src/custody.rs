//! Fund custody
//!
//! Settled bill amounts accumulate here until the administrator withdraws
//! them. The balance always equals the sum of paid bill amounts minus
//! everything withdrawn.

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, MoneyError};
use crate::error::BillingError;

/// Point-in-time view of the custody account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodySnapshot {
    /// Funds currently held
    pub balance: Money,
    /// Lifetime credits from settled bills
    pub total_collected: Money,
    /// Lifetime withdrawals
    pub total_withdrawn: Money,
}

/// Pooled balance of settled but not yet withdrawn payments
///
/// A settlement reserves its credit when the bill is closed and commits it
/// once the refund has gone out. Reservations count against the overflow
/// bound, so a payment that re-enters during a refund cannot claim headroom
/// the in-flight one already holds.
#[derive(Debug)]
pub struct FundCustody {
    balance: Money,
    pending: Money,
    total_collected: Money,
    total_withdrawn: Money,
}

impl FundCustody {
    /// Creates an empty custody account in `currency`
    pub fn new(currency: Currency) -> Self {
        Self {
            balance: Money::zero(currency),
            pending: Money::zero(currency),
            total_collected: Money::zero(currency),
            total_withdrawn: Money::zero(currency),
        }
    }

    /// Current balance
    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Credits reserved by settlements still in flight
    pub fn pending(&self) -> Money {
        self.pending
    }

    pub fn snapshot(&self) -> CustodySnapshot {
        CustodySnapshot {
            balance: self.balance,
            total_collected: self.total_collected,
            total_withdrawn: self.total_withdrawn,
        }
    }

    /// Checks that `amount` could be reserved without overflow
    ///
    /// The balance never exceeds `total_collected`, so bounding collected
    /// plus pending bounds every later credit and restore as well.
    pub fn can_reserve(&self, amount: &Money) -> Result<(), BillingError> {
        self.total_collected
            .checked_add(&self.pending)
            .and_then(|committed| committed.checked_add(amount))
            .map(|_| ())
            .map_err(|e| BillingError::invalid_input(format!("custody credit: {}", e)))
    }

    /// Holds headroom for a settlement whose refund has not completed
    pub fn reserve(&mut self, amount: Money) -> Result<(), BillingError> {
        self.can_reserve(&amount)?;
        self.pending = self
            .pending
            .checked_add(&amount)
            .map_err(|e| BillingError::invalid_input(format!("custody credit: {}", e)))?;
        Ok(())
    }

    /// Turns a reservation into a credit to the balance
    pub fn commit_reserved(&mut self, amount: Money) -> Result<(), BillingError> {
        let to_money_err =
            |e: MoneyError| BillingError::invalid_input(format!("custody credit: {}", e));
        let pending = self.pending.checked_sub(&amount).map_err(to_money_err)?;
        let balance = self.balance.checked_add(&amount).map_err(to_money_err)?;
        let collected = self.total_collected.checked_add(&amount).map_err(to_money_err)?;

        self.pending = pending;
        self.balance = balance;
        self.total_collected = collected;
        Ok(())
    }

    /// Drops a reservation whose settlement was rolled back
    pub fn release(&mut self, amount: Money) {
        self.pending = self
            .pending
            .checked_sub(&amount)
            .unwrap_or_else(|_| Money::zero(amount.currency()));
    }

    /// Zeroes the balance and returns what it held
    ///
    /// The debit is committed here, before any transfer is attempted, so a
    /// second withdrawal observes an empty balance.
    pub fn take_all(&mut self) -> Money {
        let taken = self.balance;
        self.balance = Money::zero(taken.currency());
        taken
    }

    /// Records that `amount` taken by `take_all` actually left custody
    pub fn confirm_withdrawal(&mut self, amount: Money) -> Result<(), BillingError> {
        self.total_withdrawn = self
            .total_withdrawn
            .checked_add(&amount)
            .map_err(|e| BillingError::invalid_input(format!("custody withdrawal: {}", e)))?;
        Ok(())
    }

    /// Puts back an amount taken by `take_all` after its transfer failed
    pub fn restore(&mut self, amount: Money) -> Result<(), BillingError> {
        self.balance = self
            .balance
            .checked_add(&amount)
            .map_err(|e| BillingError::invalid_input(format!("custody restore: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(minor: u128) -> Money {
        Money::from_minor(minor, Currency::USD)
    }

    fn settle(custody: &mut FundCustody, amount: Money) {
        custody.reserve(amount).unwrap();
        custody.commit_reserved(amount).unwrap();
    }

    #[test]
    fn test_credit_then_take_all() {
        let mut custody = FundCustody::new(Currency::USD);
        settle(&mut custody, usd(300));
        settle(&mut custody, usd(200));

        let taken = custody.take_all();
        custody.confirm_withdrawal(taken).unwrap();

        assert_eq!(taken, usd(500));
        assert!(custody.balance().is_zero());
        assert_eq!(custody.snapshot().total_collected, usd(500));
        assert_eq!(custody.snapshot().total_withdrawn, usd(500));
    }

    #[test]
    fn test_second_take_sees_zero() {
        let mut custody = FundCustody::new(Currency::USD);
        settle(&mut custody, usd(100));

        let first = custody.take_all();
        let second = custody.take_all();

        assert_eq!(first, usd(100));
        assert!(second.is_zero());
    }

    #[test]
    fn test_restore_after_failed_transfer() {
        let mut custody = FundCustody::new(Currency::USD);
        settle(&mut custody, usd(100));

        let taken = custody.take_all();
        custody.restore(taken).unwrap();

        assert_eq!(custody.balance(), usd(100));
        assert!(custody.snapshot().total_withdrawn.is_zero());
    }

    #[test]
    fn test_reservation_is_invisible_until_committed() {
        let mut custody = FundCustody::new(Currency::USD);
        custody.reserve(usd(40)).unwrap();

        assert!(custody.balance().is_zero());
        assert!(custody.take_all().is_zero());
        assert_eq!(custody.pending(), usd(40));

        custody.commit_reserved(usd(40)).unwrap();
        assert!(custody.pending().is_zero());
        assert_eq!(custody.balance(), usd(40));
    }

    #[test]
    fn test_released_reservation_frees_headroom() {
        let mut custody = FundCustody::new(Currency::USD);
        custody.reserve(usd(u128::MAX)).unwrap();
        assert!(custody.can_reserve(&usd(1)).is_err());

        custody.release(usd(u128::MAX));
        assert!(custody.pending().is_zero());
        assert!(custody.can_reserve(&usd(1)).is_ok());
        assert!(custody.balance().is_zero());
    }

    #[test]
    fn test_pending_reservation_blocks_overflowing_reserve() {
        let mut custody = FundCustody::new(Currency::USD);
        let half = usd(1u128 << 127);
        custody.reserve(half).unwrap();

        assert!(matches!(
            custody.reserve(half),
            Err(BillingError::InvalidInput(_))
        ));
        assert_eq!(custody.pending(), half);
    }

    #[test]
    fn test_overflowing_reserve_leaves_balance_unchanged() {
        let mut custody = FundCustody::new(Currency::USD);
        settle(&mut custody, usd(u128::MAX));

        assert!(custody.can_reserve(&usd(1)).is_err());
        assert!(custody.reserve(usd(1)).is_err());
        assert_eq!(custody.balance(), usd(u128::MAX));
        assert!(custody.pending().is_zero());
    }
}
