//! Meter registry
//!
//! Meters are metered accounts: an owner, a free-form category tag, a
//! per-unit rate and an active flag. Meters are never deleted, and the
//! per-owner index is append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use core_kernel::{MeterId, Money, PartyId};
use crate::error::BillingError;

/// Longest accepted meter type tag
pub const MAX_METER_TYPE_LEN: usize = 64;

/// A registered metered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meter {
    /// Sequential identifier, starting at 1
    pub id: MeterId,
    /// Account holder
    pub owner: PartyId,
    /// Category tag (water, electricity, gas, ...)
    pub meter_type: String,
    /// Price per consumption unit, in minor units
    pub rate: Money,
    /// Whether new bills may be issued against this meter
    pub active: bool,
    /// When the meter was registered
    pub registered_at: DateTime<Utc>,
}

/// Owns every meter and the owner -> meters index
#[derive(Debug)]
pub struct MeterRegistry {
    meters: BTreeMap<MeterId, Meter>,
    owner_index: HashMap<PartyId, Vec<MeterId>>,
    next_id: MeterId,
}

impl Default for MeterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MeterRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            meters: BTreeMap::new(),
            owner_index: HashMap::new(),
            next_id: MeterId::first(),
        }
    }

    /// Registers a new active meter and returns its id
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the meter type is blank or too long. No id
    /// is consumed on failure.
    pub fn register(
        &mut self,
        owner: PartyId,
        meter_type: &str,
        rate: Money,
        registered_at: DateTime<Utc>,
    ) -> Result<MeterId, BillingError> {
        let meter_type = normalize_meter_type(meter_type)?;

        let id = self.next_id;
        self.meters.insert(
            id,
            Meter {
                id,
                owner,
                meter_type,
                rate,
                active: true,
                registered_at,
            },
        );
        self.owner_index.entry(owner).or_default().push(id);
        self.next_id = id.next();

        Ok(id)
    }

    /// Gets a meter by id
    pub fn get(&self, id: MeterId) -> Result<&Meter, BillingError> {
        self.meters.get(&id).ok_or(BillingError::MeterNotFound(id))
    }

    fn get_mut(&mut self, id: MeterId) -> Result<&mut Meter, BillingError> {
        self.meters.get_mut(&id).ok_or(BillingError::MeterNotFound(id))
    }

    /// Overwrites the rate, returning the previous one
    ///
    /// Bills already issued keep the amount computed at issue time.
    pub fn update_rate(&mut self, id: MeterId, new_rate: Money) -> Result<Money, BillingError> {
        let meter = self.get_mut(id)?;
        let previous = meter.rate;
        meter.rate = new_rate;
        Ok(previous)
    }

    /// Flips the active flag, returning the new value
    pub fn toggle_status(&mut self, id: MeterId) -> Result<bool, BillingError> {
        let meter = self.get_mut(id)?;
        meter.active = !meter.active;
        Ok(meter.active)
    }

    /// Meters registered to `owner`, in registration order
    pub fn meters_of(&self, owner: &PartyId) -> &[MeterId] {
        self.owner_index
            .get(owner)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All meters in id order
    pub fn iter(&self) -> impl Iterator<Item = &Meter> {
        self.meters.values()
    }

    /// Number of registered meters
    pub fn count(&self) -> u64 {
        self.meters.len() as u64
    }
}

fn normalize_meter_type(meter_type: &str) -> Result<String, BillingError> {
    let trimmed = meter_type.trim();
    if trimmed.is_empty() {
        return Err(BillingError::invalid_input("meter type must not be blank"));
    }
    if trimmed.chars().count() > MAX_METER_TYPE_LEN {
        return Err(BillingError::invalid_input(format!(
            "meter type exceeds {} characters",
            MAX_METER_TYPE_LEN
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;

    fn rate(minor: u128) -> Money {
        Money::from_minor(minor, Currency::USD)
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut registry = MeterRegistry::new();
        let owner = PartyId::new();

        let first = registry.register(owner, "water", rate(5), Utc::now()).unwrap();
        let second = registry.register(owner, "gas", rate(7), Utc::now()).unwrap();

        assert_eq!(first.value(), 1);
        assert_eq!(second.value(), 2);
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn test_owner_index_keeps_registration_order() {
        let mut registry = MeterRegistry::new();
        let alice = PartyId::new();
        let bob = PartyId::new();

        let a1 = registry.register(alice, "water", rate(1), Utc::now()).unwrap();
        let b1 = registry.register(bob, "gas", rate(1), Utc::now()).unwrap();
        let a2 = registry.register(alice, "electricity", rate(1), Utc::now()).unwrap();

        assert_eq!(registry.meters_of(&alice), &[a1, a2]);
        assert_eq!(registry.meters_of(&bob), &[b1]);
        assert!(registry.meters_of(&PartyId::new()).is_empty());
    }

    #[test]
    fn test_blank_meter_type_consumes_no_id() {
        let mut registry = MeterRegistry::new();
        let owner = PartyId::new();

        assert!(matches!(
            registry.register(owner, "   ", rate(1), Utc::now()),
            Err(BillingError::InvalidInput(_))
        ));
        let id = registry.register(owner, " water ", rate(1), Utc::now()).unwrap();
        assert_eq!(id.value(), 1);
        assert_eq!(registry.get(id).unwrap().meter_type, "water");
    }

    #[test]
    fn test_toggle_twice_restores_status() {
        let mut registry = MeterRegistry::new();
        let id = registry.register(PartyId::new(), "gas", rate(1), Utc::now()).unwrap();

        assert!(!registry.toggle_status(id).unwrap());
        assert!(registry.toggle_status(id).unwrap());
        assert!(registry.get(id).unwrap().active);
    }

    #[test]
    fn test_update_rate_unknown_meter() {
        let mut registry = MeterRegistry::new();
        let missing = MeterId::new(42).unwrap();

        assert!(matches!(
            registry.update_rate(missing, rate(1)),
            Err(BillingError::MeterNotFound(id)) if id == missing
        ));
    }
}
