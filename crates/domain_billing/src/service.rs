//! Billing service
//!
//! [`BillingService`] is the entry point for every ledger operation. It owns
//! the [`LedgerState`] behind one re-entrant lock, so operations execute as a
//! single serialized stream: each either fully applies or leaves no trace.
//!
//! Operations that move funds out of the ledger commit their internal state
//! change first (bill flagged paid, custody zeroed) and only then call the
//! [`FundsTransferPort`]. The lock is re-entrant and no `RefCell` borrow is
//! held across the transfer, so a call that re-enters the service from inside
//! a transfer observes the committed state rather than a stale one. If the
//! transfer fails the internal change is rolled back.

use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::Arc;
use tracing::{error, info, warn};

use core_kernel::{BillId, Clock, Currency, MeterId, Money, PartyId, SystemClock, TransferId};
use crate::access::{AccessControl, Caller};
use crate::bill::Bill;
use crate::custody::CustodySnapshot;
use crate::error::BillingError;
use crate::events::{BillingEvent, EventEnvelope};
use crate::ledger::{AccountSummary, LedgerState, LedgerStats};
use crate::meter::Meter;
use crate::settlement::{PaymentReceipt, PaymentSettlement};
use crate::transfer::{FundsTransferPort, TransferPurpose};

/// Construction-time settings of the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingConfig {
    /// The single identity allowed to run privileged operations
    pub administrator: PartyId,
    /// Denomination of every rate, bill and payment
    pub currency: Currency,
}

/// Outcome of a withdrawal
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WithdrawalReceipt {
    pub recipient: PartyId,
    /// Everything that was in custody; zero if custody was empty
    pub amount: Money,
    /// Absent when there was nothing to transfer
    pub transfer_id: Option<TransferId>,
}

/// The serialized utility-billing ledger
pub struct BillingService {
    access: AccessControl,
    currency: Currency,
    state: ReentrantMutex<RefCell<LedgerState>>,
    transfers: Arc<dyn FundsTransferPort>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for BillingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingService")
            .field("administrator", &self.access.administrator())
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl BillingService {
    /// Creates an empty ledger
    pub fn new(
        config: BillingConfig,
        transfers: Arc<dyn FundsTransferPort>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(
            administrator = %config.administrator,
            currency = %config.currency,
            "Billing ledger initialized"
        );

        Self {
            access: AccessControl::new(config.administrator),
            currency: config.currency,
            state: ReentrantMutex::new(RefCell::new(LedgerState::new(config.currency))),
            transfers,
            clock,
        }
    }

    /// Creates a ledger that stamps bills with wall-clock time
    pub fn with_system_clock(config: BillingConfig, transfers: Arc<dyn FundsTransferPort>) -> Self {
        Self::new(config, transfers, Arc::new(SystemClock))
    }

    /// The fixed administrator
    pub fn administrator(&self) -> PartyId {
        self.access.administrator()
    }

    /// Whether `caller` may run privileged operations
    pub fn is_administrator(&self, caller: &Caller) -> bool {
        self.access.is_admin(caller)
    }

    /// Ledger denomination
    pub fn currency(&self) -> Currency {
        self.currency
    }

    fn ensure_currency(&self, amount: &Money, field: &str) -> Result<(), BillingError> {
        if amount.currency() != self.currency {
            return Err(BillingError::invalid_input(format!(
                "{} must be denominated in {}, got {}",
                field,
                self.currency,
                amount.currency()
            )));
        }
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&LedgerState) -> T) -> T {
        let guard = self.state.lock();
        let state = guard.borrow();
        f(&state)
    }

    /// Runs a mutation that involves no external effect
    ///
    /// `f` must validate before mutating so that an error leaves the state
    /// untouched.
    fn write<T>(
        &self,
        f: impl FnOnce(&mut LedgerState) -> Result<T, BillingError>,
    ) -> Result<T, BillingError> {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        f(&mut state)
    }

    // ------------------------------------------------------------------
    // Meter registry
    // ------------------------------------------------------------------

    /// Registers a new active meter for `owner`
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the caller is not the administrator
    /// - `InvalidInput` for a blank meter type or a rate in another currency
    pub fn register_meter(
        &self,
        caller: &Caller,
        owner: PartyId,
        meter_type: &str,
        rate: Money,
    ) -> Result<MeterId, BillingError> {
        self.access.require_admin(caller)?;
        self.ensure_currency(&rate, "rate")?;
        let now = self.clock.now();

        self.write(|state| {
            let meter_id = state.registry.register(owner, meter_type, rate, now)?;
            let meter_type = state.registry.get(meter_id)?.meter_type.clone();

            info!(%meter_id, %owner, %meter_type, %rate, "Meter registered");
            state.journal.record(
                BillingEvent::MeterRegistered {
                    meter_id,
                    owner,
                    meter_type,
                },
                now,
            );
            Ok(meter_id)
        })
    }

    /// Changes a meter's rate; existing bills keep their amounts
    pub fn update_meter_rate(
        &self,
        caller: &Caller,
        meter_id: MeterId,
        new_rate: Money,
    ) -> Result<(), BillingError> {
        self.access.require_admin(caller)?;
        self.ensure_currency(&new_rate, "rate")?;
        let now = self.clock.now();

        self.write(|state| {
            let previous_rate = state.registry.update_rate(meter_id, new_rate)?;

            info!(%meter_id, %previous_rate, %new_rate, "Meter rate updated");
            state.journal.record(
                BillingEvent::MeterRateUpdated {
                    meter_id,
                    previous_rate,
                    new_rate,
                },
                now,
            );
            Ok(())
        })
    }

    /// Enables or disables bill issuance for a meter, returning the new flag
    pub fn toggle_meter_status(
        &self,
        caller: &Caller,
        meter_id: MeterId,
    ) -> Result<bool, BillingError> {
        self.access.require_admin(caller)?;
        let now = self.clock.now();

        self.write(|state| {
            let active = state.registry.toggle_status(meter_id)?;

            info!(%meter_id, active, "Meter status toggled");
            state
                .journal
                .record(BillingEvent::MeterStatusToggled { meter_id, active }, now);
            Ok(active)
        })
    }

    pub fn get_meter_details(&self, meter_id: MeterId) -> Result<Meter, BillingError> {
        self.read(|state| state.registry.get(meter_id).cloned())
    }

    /// Meter ids registered to `owner`, empty for an unknown owner
    pub fn get_user_meters(&self, owner: PartyId) -> Vec<MeterId> {
        self.read(|state| state.registry.meters_of(&owner).to_vec())
    }

    /// Every meter in id order
    pub fn list_meters(&self) -> Vec<Meter> {
        self.read(|state| state.registry.iter().cloned().collect())
    }

    pub fn meter_count(&self) -> u64 {
        self.read(|state| state.registry.count())
    }

    // ------------------------------------------------------------------
    // Bill ledger
    // ------------------------------------------------------------------

    /// Issues a bill of `rate × reading` against an active meter
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the caller is not the administrator
    /// - `MeterNotFound` for an unknown meter
    /// - `MeterInactive` if the meter is disabled
    /// - `InvalidInput` if the amount overflows
    pub fn generate_bill(
        &self,
        caller: &Caller,
        meter_id: MeterId,
        reading: u64,
    ) -> Result<BillId, BillingError> {
        self.access.require_admin(caller)?;
        let now = self.clock.now();

        self.write(|state| {
            let meter = state.registry.get(meter_id)?;
            let (bill_id, amount) = {
                let bill = state.bills.issue(meter, reading, now)?;
                (bill.id, bill.amount)
            };

            info!(%bill_id, %meter_id, reading, %amount, "Bill generated");
            state.journal.record(
                BillingEvent::BillGenerated {
                    bill_id,
                    meter_id,
                    amount,
                },
                now,
            );
            Ok(bill_id)
        })
    }

    /// Bills of a meter in issue order; position is the bill index
    pub fn get_meter_bills(&self, meter_id: MeterId) -> Result<Vec<Bill>, BillingError> {
        self.read(|state| {
            state.registry.get(meter_id)?;
            Ok(state.bills.bills_for(meter_id).to_vec())
        })
    }

    pub fn get_bill(&self, meter_id: MeterId, bill_index: usize) -> Result<Bill, BillingError> {
        self.read(|state| {
            state.registry.get(meter_id)?;
            state.bills.get(meter_id, bill_index).cloned()
        })
    }

    /// Reading on the meter's most recent bill
    pub fn last_reading(&self, meter_id: MeterId) -> Result<Option<u64>, BillingError> {
        self.read(|state| {
            state.registry.get(meter_id)?;
            Ok(state.bills.last_reading(meter_id))
        })
    }

    pub fn bill_count(&self) -> u64 {
        self.read(|state| state.bills.count())
    }

    // ------------------------------------------------------------------
    // Payment settlement
    // ------------------------------------------------------------------

    /// Settles the bill at `bill_index` on `meter_id`
    ///
    /// Any caller may pay any bill. Custody is credited with exactly the
    /// bill amount and the excess of `tendered` is refunded to the caller.
    ///
    /// # Errors
    ///
    /// - `MeterNotFound` / `BillNotFound` for unknown meter or index
    /// - `BillAlreadyPaid` for a settled bill, checked before any funds move
    /// - `InsufficientPayment` if `tendered` is below the bill amount
    /// - `TransferFailed` if the refund could not be sent; the bill stays unpaid
    pub fn pay_bill(
        &self,
        caller: &Caller,
        meter_id: MeterId,
        bill_index: usize,
        tendered: Money,
    ) -> Result<PaymentReceipt, BillingError> {
        self.ensure_currency(&tendered, "tendered amount")?;
        let payer = caller.party_id();
        let paid_at = self.clock.now();
        let guard = self.state.lock();

        let plan = {
            let mut state_ref = guard.borrow_mut();
            let state = &mut *state_ref;
            state.registry.get(meter_id)?;
            let plan = PaymentSettlement::plan(
                &state.bills,
                &state.custody,
                payer,
                meter_id,
                bill_index,
                tendered,
            )?;
            PaymentSettlement::close(&mut state.bills, &mut state.custody, &plan, paid_at)?;
            plan
        };

        let refund_transfer = if plan.refund.is_zero() {
            None
        } else {
            match self.transfers.transfer(payer, plan.refund, TransferPurpose::Refund) {
                Ok(receipt) => Some(receipt.id),
                Err(err) => {
                    {
                        let mut state_ref = guard.borrow_mut();
                        let state = &mut *state_ref;
                        PaymentSettlement::reopen(&mut state.bills, &mut state.custody, &plan);
                    }
                    warn!(
                        bill_id = %plan.bill_id,
                        %payer,
                        refund = %plan.refund,
                        error = %err,
                        transient = err.is_transient(),
                        "Refund failed, payment rolled back"
                    );
                    return Err(BillingError::TransferFailed(err.to_string()));
                }
            }
        };

        let mut state_ref = guard.borrow_mut();
        let state = &mut *state_ref;
        if let Err(err) = PaymentSettlement::finalize(&mut state.custody, &plan) {
            PaymentSettlement::reopen(&mut state.bills, &mut state.custody, &plan);
            error!(
                bill_id = %plan.bill_id,
                refund = %plan.refund,
                error = %err,
                "Custody credit failed after refund, payment rolled back"
            );
            return Err(err);
        }

        info!(
            bill_id = %plan.bill_id,
            %meter_id,
            %payer,
            amount = %plan.amount,
            refund = %plan.refund,
            "Bill paid"
        );
        state.journal.record(
            BillingEvent::BillPaid {
                bill_id: plan.bill_id,
                meter_id,
                payer,
            },
            paid_at,
        );

        Ok(PaymentReceipt {
            bill_id: plan.bill_id,
            meter_id,
            payer,
            amount: plan.amount,
            refund: plan.refund,
            refund_transfer,
            paid_at,
        })
    }

    // ------------------------------------------------------------------
    // Fund custody
    // ------------------------------------------------------------------

    /// Pays the entire custody balance out to the administrator
    ///
    /// The balance is zeroed before the transfer is attempted and restored
    /// if the transfer fails. An empty custody account yields a zero
    /// receipt without calling the transfer port.
    pub fn withdraw_funds(&self, caller: &Caller) -> Result<WithdrawalReceipt, BillingError> {
        self.access.require_admin(caller)?;
        let recipient = self.access.administrator();
        let guard = self.state.lock();

        let amount = guard.borrow_mut().custody.take_all();
        if amount.is_zero() {
            info!("Withdrawal requested with empty custody");
            return Ok(WithdrawalReceipt {
                recipient,
                amount,
                transfer_id: None,
            });
        }

        match self.transfers.transfer(recipient, amount, TransferPurpose::Withdrawal) {
            Ok(receipt) => {
                let now = self.clock.now();
                let mut state_ref = guard.borrow_mut();
                let state = &mut *state_ref;
                state.custody.confirm_withdrawal(amount)?;

                info!(%amount, %recipient, transfer_id = %receipt.id, "Funds withdrawn");
                state.journal.record(
                    BillingEvent::FundsWithdrawn {
                        amount,
                        recipient,
                        transfer_id: receipt.id,
                    },
                    now,
                );
                Ok(WithdrawalReceipt {
                    recipient,
                    amount,
                    transfer_id: Some(receipt.id),
                })
            }
            Err(err) => {
                guard.borrow_mut().custody.restore(amount)?;
                warn!(
                    %amount,
                    error = %err,
                    transient = err.is_transient(),
                    "Withdrawal failed, custody restored"
                );
                Err(BillingError::TransferFailed(err.to_string()))
            }
        }
    }

    pub fn custody_balance(&self) -> Money {
        self.read(|state| state.custody.balance())
    }

    pub fn custody(&self) -> CustodySnapshot {
        self.read(|state| state.custody.snapshot())
    }

    // ------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------

    /// Dashboard totals for `owner`
    pub fn account_summary(&self, owner: PartyId) -> Result<AccountSummary, BillingError> {
        self.read(|state| state.account_summary(owner))
    }

    pub fn stats(&self) -> LedgerStats {
        self.read(|state| state.stats())
    }

    /// Journaled events after sequence `after`, in commit order
    pub fn events_since(&self, after: u64) -> Vec<EventEnvelope> {
        self.read(|state| state.journal.since(after).to_vec())
    }

    /// Verifies the custody invariant against the bills
    pub fn audit_custody(&self) -> Result<Money, BillingError> {
        self.read(|state| state.audit_custody())
    }
}
