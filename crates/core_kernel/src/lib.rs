//! Core Kernel - Foundational types for the utility billing ledger
//!
//! This crate provides the building blocks shared by the domain and API crates:
//! - Money in exact minor units with checked arithmetic
//! - Identifiers: UUID-backed parties and transfers, sequential meters and bills
//! - A `Clock` port so timestamps can be controlled under test
//! - The common `PortError` reported by external-system adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{Clock, SystemClock, FixedClock};
pub use identifiers::{PartyId, TransferId, MeterId, BillId, SequenceIdError};
pub use ports::{DomainPort, PortError};
