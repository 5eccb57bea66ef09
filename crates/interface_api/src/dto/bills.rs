//! Bill DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{BillId, MeterId, PartyId, TransferId};
use domain_billing::{Bill, PaymentReceipt};

use super::MoneyDto;

#[derive(Debug, Deserialize)]
pub struct GenerateBillRequest {
    /// Consumption since the previous bill
    pub reading: u64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PayBillRequest {
    /// Tendered amount, in minor units
    #[validate(length(min = 1, max = 39))]
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct BillResponse {
    pub id: BillId,
    pub meter_id: MeterId,
    pub index: usize,
    pub reading: u64,
    pub amount: MoneyDto,
    pub timestamp: DateTime<Utc>,
    pub paid: bool,
    pub paid_by: Option<PartyId>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl BillResponse {
    pub fn new(index: usize, bill: Bill) -> Self {
        Self {
            id: bill.id,
            meter_id: bill.meter_id,
            index,
            reading: bill.reading,
            amount: bill.amount.into(),
            timestamp: bill.timestamp,
            paid: bill.paid,
            paid_by: bill.paid_by,
            paid_at: bill.paid_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub bill_id: BillId,
    pub meter_id: MeterId,
    pub payer: PartyId,
    pub amount: MoneyDto,
    pub refund: MoneyDto,
    pub refund_transfer: Option<TransferId>,
    pub paid_at: DateTime<Utc>,
}

impl From<PaymentReceipt> for PaymentResponse {
    fn from(receipt: PaymentReceipt) -> Self {
        Self {
            bill_id: receipt.bill_id,
            meter_id: receipt.meter_id,
            payer: receipt.payer,
            amount: receipt.amount.into(),
            refund: receipt.refund.into(),
            refund_transfer: receipt.refund_transfer,
            paid_at: receipt.paid_at,
        }
    }
}
