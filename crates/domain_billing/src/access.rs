//! Access control
//!
//! The ledger has exactly one administrator, fixed when the service is
//! built. Callers are identified by a [`Caller`] capability that the
//! identity layer constructs and that is passed into every operation.

use serde::{Deserialize, Serialize};
use tracing::warn;

use core_kernel::PartyId;
use crate::error::BillingError;

/// Authenticated identity of whoever is invoking an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caller(PartyId);

impl Caller {
    /// Wraps an authenticated party
    pub fn new(party_id: PartyId) -> Self {
        Self(party_id)
    }

    /// Returns the party behind this caller
    pub fn party_id(&self) -> PartyId {
        self.0
    }
}

impl From<PartyId> for Caller {
    fn from(party_id: PartyId) -> Self {
        Self(party_id)
    }
}

/// Single fixed-administrator authorization
#[derive(Debug, Clone)]
pub struct AccessControl {
    administrator: PartyId,
}

impl AccessControl {
    /// Creates access control for the given administrator
    pub fn new(administrator: PartyId) -> Self {
        Self { administrator }
    }

    /// Returns the administrator identity
    pub fn administrator(&self) -> PartyId {
        self.administrator
    }

    /// Returns true if the caller is the administrator
    pub fn is_admin(&self, caller: &Caller) -> bool {
        caller.party_id() == self.administrator
    }

    /// Fails with `Unauthorized` unless the caller is the administrator
    pub fn require_admin(&self, caller: &Caller) -> Result<(), BillingError> {
        if self.is_admin(caller) {
            return Ok(());
        }

        warn!(caller = %caller.party_id(), "Privileged operation rejected");
        Err(BillingError::Unauthorized {
            caller: caller.party_id(),
        })
    }
}
