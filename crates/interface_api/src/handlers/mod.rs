//! Request handlers
//!
//! Handlers translate HTTP into ledger calls. The ledger is synchronous and
//! serialized internally, so handlers call it directly.

pub mod bills;
pub mod custody;
pub mod health;
pub mod ledger;
pub mod meters;
pub mod parties;

use core_kernel::{MeterId, PartyId};

use crate::error::ApiError;

/// Parses a meter id path segment (`7` or `MTR-7`)
pub(crate) fn parse_meter_id(raw: &str) -> Result<MeterId, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid meter id '{}': {}", raw, e)))
}

/// Parses a party id path segment (UUID, optionally `PTY-` prefixed)
pub(crate) fn parse_party_id(raw: &str) -> Result<PartyId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid party id '{}'", raw)))
}
