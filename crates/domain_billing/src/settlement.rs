//! Payment settlement
//!
//! Settling a bill is split into steps so the service can interleave the
//! external refund transfer:
//!
//! 1. [`PaymentSettlement::plan`] validates without mutating anything.
//! 2. [`PaymentSettlement::close`] flags the bill paid and reserves its
//!    custody credit. From here on any retried or re-entrant payment of the
//!    same bill fails `BillAlreadyPaid`.
//! 3. The refund of any excess is transferred.
//! 4. [`PaymentSettlement::finalize`] commits the reserved credit, or
//!    [`PaymentSettlement::reopen`] undoes step 2 if the refund failed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BillId, MeterId, Money, MoneyError, PartyId, TransferId};
use crate::bill::BillLedger;
use crate::custody::FundCustody;
use crate::error::BillingError;

/// A validated payment that has not been applied yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementPlan {
    pub bill_id: BillId,
    pub meter_id: MeterId,
    pub bill_index: usize,
    pub payer: PartyId,
    /// Exactly the bill amount; this is what custody receives
    pub amount: Money,
    /// `tendered - amount`, returned to the payer
    pub refund: Money,
}

/// Outcome of a successful payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub bill_id: BillId,
    pub meter_id: MeterId,
    pub payer: PartyId,
    pub amount: Money,
    pub refund: Money,
    /// Transfer carrying the refund, absent for exact payments
    pub refund_transfer: Option<TransferId>,
    pub paid_at: DateTime<Utc>,
}

/// Stateless steps of the bill payment workflow
pub struct PaymentSettlement;

impl PaymentSettlement {
    /// Validates a payment of `tendered` against the bill at `bill_index`
    ///
    /// # Errors
    ///
    /// - `BillNotFound` if the index is out of range
    /// - `BillAlreadyPaid` if the bill is settled (checked before amounts)
    /// - `InsufficientPayment` if `tendered` is below the bill amount
    /// - `InvalidInput` on currency mismatch or custody overflow
    pub fn plan(
        bills: &BillLedger,
        custody: &FundCustody,
        payer: PartyId,
        meter_id: MeterId,
        bill_index: usize,
        tendered: Money,
    ) -> Result<SettlementPlan, BillingError> {
        let bill = bills.get(meter_id, bill_index)?;

        if bill.paid {
            return Err(BillingError::BillAlreadyPaid(bill.id));
        }

        let to_input_err =
            |e: MoneyError| BillingError::invalid_input(format!("tendered amount: {}", e));
        if !tendered.covers(&bill.amount).map_err(to_input_err)? {
            return Err(BillingError::InsufficientPayment {
                required: bill.amount,
                tendered,
            });
        }
        let refund = tendered.checked_sub(&bill.amount).map_err(to_input_err)?;

        custody.can_reserve(&bill.amount)?;

        Ok(SettlementPlan {
            bill_id: bill.id,
            meter_id,
            bill_index,
            payer,
            amount: bill.amount,
            refund,
        })
    }

    /// Flags the planned bill as paid and reserves its custody credit
    pub fn close(
        bills: &mut BillLedger,
        custody: &mut FundCustody,
        plan: &SettlementPlan,
        paid_at: DateTime<Utc>,
    ) -> Result<(), BillingError> {
        let bill = bills.get_mut(plan.meter_id, plan.bill_index)?;
        if bill.paid {
            return Err(BillingError::BillAlreadyPaid(bill.id));
        }
        custody.reserve(plan.amount)?;
        bill.mark_paid(plan.payer, paid_at);
        Ok(())
    }

    /// Reverts `close` after a failed refund
    pub fn reopen(bills: &mut BillLedger, custody: &mut FundCustody, plan: &SettlementPlan) {
        if let Ok(bill) = bills.get_mut(plan.meter_id, plan.bill_index) {
            bill.clear_payment();
        }
        custody.release(plan.amount);
    }

    /// Credits custody with exactly the bill amount
    pub fn finalize(custody: &mut FundCustody, plan: &SettlementPlan) -> Result<(), BillingError> {
        custody.commit_reserved(plan.amount)
    }
}
