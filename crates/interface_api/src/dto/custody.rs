//! Custody DTOs

use serde::Serialize;

use core_kernel::{PartyId, TransferId};
use domain_billing::{CustodySnapshot, WithdrawalReceipt};

use super::MoneyDto;

#[derive(Debug, Serialize)]
pub struct CustodyResponse {
    pub balance: MoneyDto,
    pub total_collected: MoneyDto,
    pub total_withdrawn: MoneyDto,
}

impl From<CustodySnapshot> for CustodyResponse {
    fn from(snapshot: CustodySnapshot) -> Self {
        Self {
            balance: snapshot.balance.into(),
            total_collected: snapshot.total_collected.into(),
            total_withdrawn: snapshot.total_withdrawn.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WithdrawalResponse {
    pub recipient: PartyId,
    pub amount: MoneyDto,
    pub transfer_id: Option<TransferId>,
}

impl From<WithdrawalReceipt> for WithdrawalResponse {
    fn from(receipt: WithdrawalReceipt) -> Self {
        Self {
            recipient: receipt.recipient,
            amount: receipt.amount.into(),
            transfer_id: receipt.transfer_id,
        }
    }
}
