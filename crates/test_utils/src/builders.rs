//! Test Data Builders
//!
//! Provides a builder for a fully wired billing ledger: service, recording
//! transfer gateway and a controllable clock. Tests specify only what they
//! care about and use defaults for everything else.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use core_kernel::{BillId, Currency, FixedClock, MeterId, Money, PartyId};
use domain_billing::{BillingConfig, BillingService, Caller, InMemoryTransferGateway};

use crate::fixtures::{PartyFixtures, TemporalFixtures};

/// Builder for a ledger under test
pub struct LedgerScenarioBuilder {
    administrator: PartyId,
    currency: Currency,
    start: DateTime<Utc>,
    rejecting_transfers: Option<String>,
}

impl Default for LedgerScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerScenarioBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            administrator: PartyFixtures::administrator(),
            currency: Currency::ETH,
            start: TemporalFixtures::epoch(),
            rejecting_transfers: None,
        }
    }

    /// Sets the administrator identity
    pub fn with_administrator(mut self, administrator: PartyId) -> Self {
        self.administrator = administrator;
        self
    }

    /// Sets the ledger currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Sets the instant the clock starts at
    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Makes the gateway reject every transfer from the start
    pub fn with_rejecting_transfers(mut self, reason: impl Into<String>) -> Self {
        self.rejecting_transfers = Some(reason.into());
        self
    }

    /// Builds the scenario
    pub fn build(self) -> LedgerScenario {
        let gateway = Arc::new(InMemoryTransferGateway::new());
        if let Some(reason) = self.rejecting_transfers {
            gateway.reject_transfers(reason);
        }
        let clock = Arc::new(FixedClock::new(self.start));
        let service = Arc::new(BillingService::new(
            BillingConfig {
                administrator: self.administrator,
                currency: self.currency,
            },
            gateway.clone(),
            clock.clone(),
        ));

        LedgerScenario {
            service,
            gateway,
            clock,
            admin: Caller::new(self.administrator),
        }
    }
}

/// A wired ledger with handles on its collaborators
pub struct LedgerScenario {
    pub service: Arc<BillingService>,
    pub gateway: Arc<InMemoryTransferGateway>,
    pub clock: Arc<FixedClock>,
    pub admin: Caller,
}

impl LedgerScenario {
    /// Registers a meter as the administrator
    ///
    /// # Panics
    ///
    /// Panics if registration fails.
    pub fn register_meter(&self, owner: PartyId, meter_type: &str, rate: Money) -> MeterId {
        self.service
            .register_meter(&self.admin, owner, meter_type, rate)
            .expect("meter registration failed")
    }

    /// Issues a bill as the administrator
    ///
    /// # Panics
    ///
    /// Panics if issuance fails.
    pub fn issue_bill(&self, meter_id: MeterId, reading: u64) -> BillId {
        self.service
            .generate_bill(&self.admin, meter_id, reading)
            .expect("bill generation failed")
    }

    /// Registers a meter and issues one bill on it
    pub fn meter_with_bill(
        &self,
        owner: PartyId,
        rate: Money,
        reading: u64,
    ) -> (MeterId, BillId) {
        let meter_id = self.register_meter(owner, "electricity", rate);
        let bill_id = self.issue_bill(meter_id, reading);
        (meter_id, bill_id)
    }
}
