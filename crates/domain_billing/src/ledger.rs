//! Ledger state
//!
//! [`LedgerState`] is the single state object behind the billing service:
//! meter registry, bill ledger, custody account and event journal. It is
//! only ever touched through the service's lock.
//!
//! # Invariants
//!
//! - Meter ids and bill ids are dense sequences starting at 1
//! - `custody.balance == Σ amount(paid bills) - total withdrawn`
//! - A paid bill is never reopened except by the rollback of its own
//!   in-flight settlement

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, PartyId};
use crate::bill::BillLedger;
use crate::custody::FundCustody;
use crate::error::BillingError;
use crate::events::EventJournal;
use crate::meter::MeterRegistry;

/// Aggregate billing state
#[derive(Debug)]
pub struct LedgerState {
    pub(crate) registry: MeterRegistry,
    pub(crate) bills: BillLedger,
    pub(crate) custody: FundCustody,
    pub(crate) journal: EventJournal,
    currency: Currency,
}

/// Per-owner totals shown on an account dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub owner: PartyId,
    pub meter_count: usize,
    pub active_meters: usize,
    pub total_bills: usize,
    pub unpaid_bills: usize,
    /// Sum of unpaid bill amounts
    pub outstanding: Money,
    /// Sum of paid bill amounts
    pub settled: Money,
}

/// Ledger-wide counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub meter_count: u64,
    pub bill_count: u64,
    pub last_event_sequence: u64,
}

impl LedgerState {
    /// Creates empty state denominated in `currency`
    pub fn new(currency: Currency) -> Self {
        Self {
            registry: MeterRegistry::new(),
            bills: BillLedger::new(),
            custody: FundCustody::new(currency),
            journal: EventJournal::new(),
            currency,
        }
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            meter_count: self.registry.count(),
            bill_count: self.bills.count(),
            last_event_sequence: self.journal.last_sequence(),
        }
    }

    /// Totals across every meter registered to `owner`
    ///
    /// An owner with no meters gets an all-zero summary.
    pub fn account_summary(&self, owner: PartyId) -> Result<AccountSummary, BillingError> {
        let mut summary = AccountSummary {
            owner,
            meter_count: 0,
            active_meters: 0,
            total_bills: 0,
            unpaid_bills: 0,
            outstanding: Money::zero(self.currency),
            settled: Money::zero(self.currency),
        };

        for meter_id in self.registry.meters_of(&owner) {
            let meter = self.registry.get(*meter_id)?;
            summary.meter_count += 1;
            if meter.active {
                summary.active_meters += 1;
            }

            for bill in self.bills.bills_for(*meter_id) {
                summary.total_bills += 1;
                let bucket = if bill.paid {
                    &mut summary.settled
                } else {
                    summary.unpaid_bills += 1;
                    &mut summary.outstanding
                };
                *bucket = bucket
                    .checked_add(&bill.amount)
                    .map_err(|e| BillingError::invalid_input(format!("account summary: {}", e)))?;
            }
        }

        Ok(summary)
    }

    /// Recomputes custody from the bills and checks it against the account
    ///
    /// Bills closed by an in-flight settlement are matched by its pending
    /// reservation. Used by tests and diagnostics; returns the expected
    /// balance.
    pub fn audit_custody(&self) -> Result<Money, BillingError> {
        let to_err = |e: core_kernel::MoneyError| {
            BillingError::invalid_input(format!("custody audit: {}", e))
        };

        let mut collected = Money::zero(self.currency);
        for meter in self.registry.iter() {
            for bill in self.bills.bills_for(meter.id).iter().filter(|b| b.paid) {
                collected = collected.checked_add(&bill.amount).map_err(to_err)?;
            }
        }

        let snapshot = self.custody.snapshot();
        let expected = collected
            .checked_sub(&snapshot.total_withdrawn)
            .and_then(|held| held.checked_sub(&self.custody.pending()))
            .map_err(to_err)?;
        if expected != snapshot.balance {
            return Err(BillingError::invalid_input(format!(
                "custody balance {} does not match settled bills {}",
                snapshot.balance, expected
            )));
        }
        Ok(expected)
    }
}
