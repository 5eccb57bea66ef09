//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the billing ledger. Amounts are in
//! ETH minor units (wei) unless a name says otherwise.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{Currency, Money, PartyId};
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Wraps raw wei
    pub fn wei(minor: u128) -> Money {
        Money::from_minor(minor, Currency::ETH)
    }

    /// Per-unit electricity rate
    pub fn electricity_rate() -> Money {
        Self::wei(1_000)
    }

    /// Per-unit water rate
    pub fn water_rate() -> Money {
        Self::wei(250)
    }

    /// Creates a zero amount
    pub fn zero() -> Money {
        Money::zero(Currency::ETH)
    }

    /// An amount in another currency for mismatch tests
    pub fn usd_100() -> Money {
        Money::from_minor(10_000, Currency::USD)
    }
}

/// Fixture for party identities
pub struct PartyFixtures;

impl PartyFixtures {
    /// A stable administrator identity
    pub fn administrator() -> PartyId {
        party(0xA0)
    }

    /// A stable meter owner identity
    pub fn owner() -> PartyId {
        party(0x01)
    }

    /// A second, unrelated party
    pub fn stranger() -> PartyId {
        party(0x02)
    }
}

/// Fixture for time values
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Fixed instant the scenario clock starts at
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// Fixture for meter type strings
pub struct StringFixtures;

impl StringFixtures {
    pub fn electricity() -> &'static str {
        "electricity"
    }

    pub fn water() -> &'static str {
        "water"
    }

    pub fn gas() -> &'static str {
        "gas"
    }
}

/// Deterministic party id derived from `tag`
fn party(tag: u128) -> PartyId {
    PartyId::from_uuid(Uuid::from_u128(tag))
}
