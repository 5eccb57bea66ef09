//! Bill ledger
//!
//! Bills are issued from meter readings. The amount is fixed at issue time
//! from the meter's rate at that instant and never recomputed. Bills are
//! kept in an append-only sequence per meter; the position in that
//! sequence is the bill index used to address a bill for payment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::{BillId, MeterId, Money, PartyId};
use crate::error::BillingError;
use crate::meter::Meter;

/// An invoice for one meter reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// Globally unique sequential identifier
    pub id: BillId,
    /// Meter the reading was taken from
    pub meter_id: MeterId,
    /// Consumption units
    pub reading: u64,
    /// `rate × reading` at issue time
    pub amount: Money,
    /// Issue time
    pub timestamp: DateTime<Utc>,
    /// Settlement flag, false -> true exactly once
    pub paid: bool,
    /// Who settled the bill
    pub paid_by: Option<PartyId>,
    /// When the bill was settled
    pub paid_at: Option<DateTime<Utc>>,
}

impl Bill {
    /// Marks the bill as settled by `payer`
    pub(crate) fn mark_paid(&mut self, payer: PartyId, at: DateTime<Utc>) {
        self.paid = true;
        self.paid_by = Some(payer);
        self.paid_at = Some(at);
    }

    /// Undoes `mark_paid` when the surrounding settlement is rolled back
    pub(crate) fn clear_payment(&mut self) {
        self.paid = false;
        self.paid_by = None;
        self.paid_at = None;
    }
}

/// Owns every bill, grouped by meter
#[derive(Debug)]
pub struct BillLedger {
    bills: HashMap<MeterId, Vec<Bill>>,
    next_id: BillId,
    issued: u64,
}

impl Default for BillLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl BillLedger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self {
            bills: HashMap::new(),
            next_id: BillId::first(),
            issued: 0,
        }
    }

    /// Issues a bill against `meter` for `reading` units
    ///
    /// # Errors
    ///
    /// - `MeterInactive` if the meter is disabled
    /// - `InvalidInput` if `rate × reading` overflows
    ///
    /// No bill id is consumed on failure.
    pub fn issue(
        &mut self,
        meter: &Meter,
        reading: u64,
        timestamp: DateTime<Utc>,
    ) -> Result<&Bill, BillingError> {
        if !meter.active {
            return Err(BillingError::MeterInactive(meter.id));
        }

        let amount = meter.rate.checked_mul_units(reading).map_err(|e| {
            BillingError::invalid_input(format!("bill amount for {}: {}", meter.id, e))
        })?;

        let id = self.next_id;
        let sequence = self.bills.entry(meter.id).or_default();
        sequence.push(Bill {
            id,
            meter_id: meter.id,
            reading,
            amount,
            timestamp,
            paid: false,
            paid_by: None,
            paid_at: None,
        });
        self.next_id = id.next();
        self.issued += 1;

        let index = sequence.len() - 1;
        Ok(&sequence[index])
    }

    /// Bills for a meter in issue order (empty if none were issued)
    pub fn bills_for(&self, meter_id: MeterId) -> &[Bill] {
        self.bills
            .get(&meter_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Gets the bill at `index` within the meter's sequence
    pub fn get(&self, meter_id: MeterId, index: usize) -> Result<&Bill, BillingError> {
        self.bills_for(meter_id)
            .get(index)
            .ok_or(BillingError::BillNotFound { meter_id, index })
    }

    pub(crate) fn get_mut(
        &mut self,
        meter_id: MeterId,
        index: usize,
    ) -> Result<&mut Bill, BillingError> {
        self.bills
            .get_mut(&meter_id)
            .and_then(|sequence| sequence.get_mut(index))
            .ok_or(BillingError::BillNotFound { meter_id, index })
    }

    /// Reading of the most recent bill on the meter
    pub fn last_reading(&self, meter_id: MeterId) -> Option<u64> {
        self.bills_for(meter_id).last().map(|bill| bill.reading)
    }

    /// Total number of bills issued across all meters
    pub fn count(&self) -> u64 {
        self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;

    fn meter(id: u64, rate: u128, active: bool) -> Meter {
        Meter {
            id: MeterId::new(id).unwrap(),
            owner: PartyId::new(),
            meter_type: "electricity".to_string(),
            rate: Money::from_minor(rate, Currency::ETH),
            active,
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn test_amount_is_rate_times_reading() {
        let mut ledger = BillLedger::new();
        let bill = ledger.issue(&meter(1, 1000, true), 100, Utc::now()).unwrap();

        assert_eq!(bill.id.value(), 1);
        assert_eq!(bill.amount.minor_units(), 100_000);
        assert!(!bill.paid);
    }

    #[test]
    fn test_bill_ids_are_global_across_meters() {
        let mut ledger = BillLedger::new();
        let m1 = meter(1, 1, true);
        let m2 = meter(2, 1, true);

        let a = ledger.issue(&m1, 1, Utc::now()).unwrap().id;
        let b = ledger.issue(&m2, 1, Utc::now()).unwrap().id;
        let c = ledger.issue(&m1, 1, Utc::now()).unwrap().id;

        assert_eq!((a.value(), b.value(), c.value()), (1, 2, 3));
        assert_eq!(ledger.bills_for(m1.id).len(), 2);
        assert_eq!(ledger.get(m1.id, 1).unwrap().id, c);
        assert_eq!(ledger.count(), 3);
    }

    #[test]
    fn test_inactive_meter_rejected_without_consuming_id() {
        let mut ledger = BillLedger::new();
        let inactive = meter(1, 10, false);

        assert!(matches!(
            ledger.issue(&inactive, 5, Utc::now()),
            Err(BillingError::MeterInactive(_))
        ));
        assert_eq!(ledger.count(), 0);

        let bill = ledger.issue(&meter(1, 10, true), 5, Utc::now()).unwrap();
        assert_eq!(bill.id.value(), 1);
    }

    #[test]
    fn test_overflowing_amount_is_invalid_input() {
        let mut ledger = BillLedger::new();
        let expensive = meter(1, u128::MAX, true);

        assert!(matches!(
            ledger.issue(&expensive, 2, Utc::now()),
            Err(BillingError::InvalidInput(_))
        ));
        assert_eq!(ledger.count(), 0);
    }

    #[test]
    fn test_out_of_range_index() {
        let ledger = BillLedger::new();
        let id = MeterId::first();

        assert!(matches!(
            ledger.get(id, 0),
            Err(BillingError::BillNotFound { index: 0, .. })
        ));
        assert_eq!(ledger.last_reading(id), None);
    }
}
