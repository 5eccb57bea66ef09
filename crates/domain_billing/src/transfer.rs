//! Funds transfer port
//!
//! Refunds of overpayment and withdrawals of custodied funds leave the
//! ledger through a [`FundsTransferPort`]. The ledger treats the transfer
//! as the commit point of the operation: its own state is already updated
//! when the port is called and is rolled back if the port fails.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use core_kernel::{DomainPort, Money, PartyId, PortError, TransferId};

/// Why funds are leaving the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferPurpose {
    /// Excess of a tendered payment returned to the payer
    Refund,
    /// Custody balance paid out to the administrator
    Withdrawal,
}

/// Confirmation of a completed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub id: TransferId,
    pub recipient: PartyId,
    pub amount: Money,
    pub purpose: TransferPurpose,
    pub completed_at: DateTime<Utc>,
}

/// Outbound payment rail
pub trait FundsTransferPort: DomainPort {
    /// Moves `amount` to `recipient`
    ///
    /// Implementations must either complete the transfer and return a
    /// receipt or fail without moving any funds. The call runs while the
    /// ledger lock is held, so it may block the calling thread; async
    /// callers run ledger operations on a blocking pool.
    fn transfer(
        &self,
        recipient: PartyId,
        amount: Money,
        purpose: TransferPurpose,
    ) -> Result<TransferReceipt, PortError>;
}

#[derive(Debug, Default)]
struct GatewayState {
    receipts: Vec<TransferReceipt>,
    rejecting: Option<String>,
}

/// In-process payment rail that records every transfer
///
/// Used by the standalone server and by tests. It can be switched into a
/// rejecting mode to exercise rollback paths.
#[derive(Debug, Default)]
pub struct InMemoryTransferGateway {
    state: Mutex<GatewayState>,
}

impl InMemoryTransferGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent transfer fail with `reason`
    pub fn reject_transfers(&self, reason: impl Into<String>) {
        self.state.lock().rejecting = Some(reason.into());
    }

    /// Resumes accepting transfers
    pub fn accept_transfers(&self) {
        self.state.lock().rejecting = None;
    }

    /// Every completed transfer in order
    pub fn receipts(&self) -> Vec<TransferReceipt> {
        self.state.lock().receipts.clone()
    }

    /// Total minor units paid to `party` for `purpose`, saturating at `u128::MAX`
    pub fn total_paid_to(&self, party: &PartyId, purpose: TransferPurpose) -> u128 {
        self.state
            .lock()
            .receipts
            .iter()
            .filter(|r| &r.recipient == party && r.purpose == purpose)
            .fold(0u128, |total, r| total.saturating_add(r.amount.minor_units()))
    }

    /// Totals per recipient across all purposes, saturating at `u128::MAX`
    pub fn payouts(&self) -> HashMap<PartyId, u128> {
        let mut totals: HashMap<PartyId, u128> = HashMap::new();
        for receipt in &self.state.lock().receipts {
            let total = totals.entry(receipt.recipient).or_insert(0);
            *total = total.saturating_add(receipt.amount.minor_units());
        }
        totals
    }
}

impl DomainPort for InMemoryTransferGateway {}

impl FundsTransferPort for InMemoryTransferGateway {
    fn transfer(
        &self,
        recipient: PartyId,
        amount: Money,
        purpose: TransferPurpose,
    ) -> Result<TransferReceipt, PortError> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.rejecting {
            return Err(PortError::rejected(reason.clone()));
        }

        let receipt = TransferReceipt {
            id: TransferId::new_v7(),
            recipient,
            amount,
            purpose,
            completed_at: Utc::now(),
        };
        debug!(transfer_id = %receipt.id, %recipient, %amount, ?purpose, "Transfer completed");
        state.receipts.push(receipt.clone());
        Ok(receipt)
    }
}
