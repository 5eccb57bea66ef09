//! Billing domain errors

use core_kernel::{BillId, MeterId, Money, PartyId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in the billing domain
///
/// Every error aborts the operation that produced it; no partial mutation
/// survives a failed call.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Privileged operation attempted by someone other than the administrator
    #[error("Unauthorized: {caller} is not the administrator")]
    Unauthorized { caller: PartyId },

    /// Meter not found
    #[error("Meter not found: {0}")]
    MeterNotFound(MeterId),

    /// Bill index out of range for the meter
    #[error("Bill not found: index {index} on {meter_id}")]
    BillNotFound { meter_id: MeterId, index: usize },

    /// Bill generation on a disabled meter
    #[error("Meter is not active: {0}")]
    MeterInactive(MeterId),

    /// Tendered amount does not cover the bill
    #[error("Insufficient payment: required {required}, tendered {tendered}")]
    InsufficientPayment { required: Money, tendered: Money },

    /// Duplicate settlement attempt
    #[error("Bill already paid: {0}")]
    BillAlreadyPaid(BillId),

    /// Malformed or out-of-range input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The external funds transfer failed and the ledger was rolled back
    #[error("Funds transfer failed: {0}")]
    TransferFailed(String),
}

/// Coarse classification of billing failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    MeterInactive,
    InsufficientPayment,
    BillAlreadyPaid,
    InvalidInput,
    TransferFailed,
}

impl BillingError {
    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        BillingError::InvalidInput(message.into())
    }

    /// Returns the kind of failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            BillingError::Unauthorized { .. } => ErrorKind::Unauthorized,
            BillingError::MeterNotFound(_) | BillingError::BillNotFound { .. } => {
                ErrorKind::NotFound
            }
            BillingError::MeterInactive(_) => ErrorKind::MeterInactive,
            BillingError::InsufficientPayment { .. } => ErrorKind::InsufficientPayment,
            BillingError::BillAlreadyPaid(_) => ErrorKind::BillAlreadyPaid,
            BillingError::InvalidInput(_) => ErrorKind::InvalidInput,
            BillingError::TransferFailed(_) => ErrorKind::TransferFailed,
        }
    }
}
