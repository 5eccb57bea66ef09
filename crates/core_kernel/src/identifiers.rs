//! Strongly-typed identifiers for domain entities
//!
//! Parties and transfers are identified by UUID newtypes. Ledger entities
//! (meters, bills) are identified by positive sequence numbers handed out
//! by the ledger itself, so they get their own newtype family.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

/// Error parsing a sequential identifier
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceIdError {
    #[error("Invalid identifier: {0}")]
    Invalid(String),

    #[error("Sequential identifiers start at 1")]
    Zero,
}

macro_rules! define_sequence_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "u64", into = "u64")]
        pub struct $name(u64);

        impl TryFrom<u64> for $name {
            type Error = SequenceIdError;

            fn try_from(value: u64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }

        impl $name {
            /// The first identifier handed out by a sequence
            pub fn first() -> Self {
                Self(1)
            }

            /// Wraps a raw sequence number, rejecting zero
            pub fn new(value: u64) -> Result<Self, SequenceIdError> {
                if value == 0 {
                    return Err(SequenceIdError::Zero);
                }
                Ok(Self(value))
            }

            /// The identifier following this one
            pub fn next(&self) -> Self {
                Self(self.0 + 1)
            }

            /// Returns the raw sequence number
            pub fn value(&self) -> u64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = SequenceIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                let value = raw
                    .parse::<u64>()
                    .map_err(|_| SequenceIdError::Invalid(s.to_string()))?;
                Self::new(value)
            }
        }

    };
}

// Party domain identifiers
define_id!(PartyId, "PTY");

// Settlement identifiers
define_id!(TransferId, "TRF");

// Ledger identifiers
define_sequence_id!(MeterId, "MTR");
define_sequence_id!(BillId, "BIL");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_id_display() {
        let id = PartyId::new();
        assert!(id.to_string().starts_with("PTY-"));
    }

    #[test]
    fn test_party_id_parsing() {
        let original = PartyId::new_v7();
        let parsed: PartyId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_sequence_id_rejects_zero() {
        assert_eq!(MeterId::new(0), Err(SequenceIdError::Zero));
        assert_eq!("BIL-0".parse::<BillId>(), Err(SequenceIdError::Zero));
    }

    #[test]
    fn test_sequence_id_parses_with_and_without_prefix() {
        assert_eq!("MTR-7".parse::<MeterId>().unwrap().value(), 7);
        assert_eq!("7".parse::<MeterId>().unwrap().value(), 7);
        assert!("MTR-x".parse::<MeterId>().is_err());
    }

    #[test]
    fn test_sequence_id_next() {
        let first = BillId::first();
        assert_eq!(first.value(), 1);
        assert_eq!(first.next().value(), 2);
        assert!(first < first.next());
    }

    #[test]
    fn test_sequence_id_deserialization_rejects_zero() {
        let meter: MeterId = serde_json::from_str("3").unwrap();
        assert_eq!(meter.value(), 3);
        assert_eq!(serde_json::to_string(&meter).unwrap(), "3");

        assert!(serde_json::from_str::<MeterId>("0").is_err());
        assert!(serde_json::from_str::<BillId>("0").is_err());
    }
}
