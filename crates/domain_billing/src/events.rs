//! Ledger notifications
//!
//! Every committed mutation appends one event to the journal in the same
//! critical section as the mutation itself, so the journal order is the
//! commit order. Failed operations record nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::{BillId, MeterId, Money, PartyId, TransferId};

/// Notifications emitted by the billing ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BillingEvent {
    /// A meter was registered
    MeterRegistered {
        meter_id: MeterId,
        owner: PartyId,
        meter_type: String,
    },

    /// A meter's rate was changed
    MeterRateUpdated {
        meter_id: MeterId,
        previous_rate: Money,
        new_rate: Money,
    },

    /// A meter was enabled or disabled
    MeterStatusToggled {
        meter_id: MeterId,
        active: bool,
    },

    /// A bill was issued
    BillGenerated {
        bill_id: BillId,
        meter_id: MeterId,
        amount: Money,
    },

    /// A bill was settled
    BillPaid {
        bill_id: BillId,
        meter_id: MeterId,
        payer: PartyId,
    },

    /// Custodied funds were paid out to the administrator
    FundsWithdrawn {
        amount: Money,
        recipient: PartyId,
        transfer_id: TransferId,
    },
}

impl BillingEvent {
    /// Short name used in logs and API filters
    pub fn name(&self) -> &'static str {
        match self {
            BillingEvent::MeterRegistered { .. } => "meter_registered",
            BillingEvent::MeterRateUpdated { .. } => "meter_rate_updated",
            BillingEvent::MeterStatusToggled { .. } => "meter_status_toggled",
            BillingEvent::BillGenerated { .. } => "bill_generated",
            BillingEvent::BillPaid { .. } => "bill_paid",
            BillingEvent::FundsWithdrawn { .. } => "funds_withdrawn",
        }
    }
}

/// A journaled event with its position in commit order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Position in the journal, starting at 1
    pub sequence: u64,
    /// Commit time
    pub occurred_at: DateTime<Utc>,
    /// The event itself
    pub event: BillingEvent,
}

/// Append-only, in-memory event journal
#[derive(Debug, Default)]
pub struct EventJournal {
    entries: Vec<EventEnvelope>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event and returns its sequence number
    pub fn record(&mut self, event: BillingEvent, occurred_at: DateTime<Utc>) -> u64 {
        let sequence = self.entries.len() as u64 + 1;

        info!(sequence, event = event.name(), detail = ?event, "Billing event");

        self.entries.push(EventEnvelope {
            sequence,
            occurred_at,
            event,
        });
        sequence
    }

    /// Events with a sequence number greater than `after`
    pub fn since(&self, after: u64) -> &[EventEnvelope] {
        let start = usize::try_from(after)
            .unwrap_or(usize::MAX)
            .min(self.entries.len());
        &self.entries[start..]
    }

    /// Sequence number of the latest event, 0 if none
    pub fn last_sequence(&self) -> u64 {
        self.entries.len() as u64
    }
}
