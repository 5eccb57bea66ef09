//! Reporting DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::PartyId;
use domain_billing::{AccountSummary, BillingEvent, EventEnvelope};

use super::MoneyDto;

#[derive(Debug, Serialize)]
pub struct AccountSummaryResponse {
    pub owner: PartyId,
    pub meter_count: usize,
    pub active_meters: usize,
    pub total_bills: usize,
    pub unpaid_bills: usize,
    pub outstanding: MoneyDto,
    pub settled: MoneyDto,
}

impl From<AccountSummary> for AccountSummaryResponse {
    fn from(summary: AccountSummary) -> Self {
        Self {
            owner: summary.owner,
            meter_count: summary.meter_count,
            active_meters: summary.active_meters,
            total_bills: summary.total_bills,
            unpaid_bills: summary.unpaid_bills,
            outstanding: summary.outstanding.into(),
            settled: summary.settled.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Return events with a sequence number greater than this
    #[serde(default)]
    pub after: u64,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub sequence: u64,
    pub occurred_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: &'static str,
    /// Event payload with amounts rendered as [`MoneyDto`]
    pub data: serde_json::Value,
}

impl From<EventEnvelope> for EventResponse {
    fn from(envelope: EventEnvelope) -> Self {
        let event_type = envelope.event.name();
        let data = match envelope.event {
            BillingEvent::MeterRegistered {
                meter_id,
                owner,
                meter_type,
            } => serde_json::json!({
                "meter_id": meter_id,
                "owner": owner,
                "meter_type": meter_type,
            }),
            BillingEvent::MeterRateUpdated {
                meter_id,
                previous_rate,
                new_rate,
            } => serde_json::json!({
                "meter_id": meter_id,
                "previous_rate": MoneyDto::from(previous_rate),
                "new_rate": MoneyDto::from(new_rate),
            }),
            BillingEvent::MeterStatusToggled { meter_id, active } => serde_json::json!({
                "meter_id": meter_id,
                "active": active,
            }),
            BillingEvent::BillGenerated {
                bill_id,
                meter_id,
                amount,
            } => serde_json::json!({
                "bill_id": bill_id,
                "meter_id": meter_id,
                "amount": MoneyDto::from(amount),
            }),
            BillingEvent::BillPaid {
                bill_id,
                meter_id,
                payer,
            } => serde_json::json!({
                "bill_id": bill_id,
                "meter_id": meter_id,
                "payer": payer,
            }),
            BillingEvent::FundsWithdrawn {
                amount,
                recipient,
                transfer_id,
            } => serde_json::json!({
                "amount": MoneyDto::from(amount),
                "recipient": recipient,
                "transfer_id": transfer_id,
            }),
        };

        Self {
            sequence: envelope.sequence,
            occurred_at: envelope.occurred_at,
            event_type,
            data,
        }
    }
}
