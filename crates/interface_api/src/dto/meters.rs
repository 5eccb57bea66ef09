//! Meter DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{MeterId, PartyId};
use domain_billing::{Meter, MAX_METER_TYPE_LEN};

use super::MoneyDto;

/// `MAX_METER_TYPE_LEN` as the `u64` the validator length check expects
const MAX_METER_TYPE_LEN_U64: u64 = MAX_METER_TYPE_LEN as u64;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterMeterRequest {
    pub owner: PartyId,
    #[validate(length(min = 1, max = MAX_METER_TYPE_LEN_U64))]
    pub meter_type: String,
    /// Price per unit, in minor units
    #[validate(length(min = 1, max = 39))]
    pub rate: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRateRequest {
    #[validate(length(min = 1, max = 39))]
    pub rate: String,
}

#[derive(Debug, Serialize)]
pub struct MeterResponse {
    pub id: MeterId,
    pub owner: PartyId,
    pub meter_type: String,
    pub rate: MoneyDto,
    pub active: bool,
    pub registered_at: DateTime<Utc>,
}

impl From<Meter> for MeterResponse {
    fn from(meter: Meter) -> Self {
        Self {
            id: meter.id,
            owner: meter.owner,
            meter_type: meter.meter_type,
            rate: meter.rate.into(),
            active: meter.active,
            registered_at: meter.registered_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeterStatusResponse {
    pub id: MeterId,
    pub active: bool,
}
