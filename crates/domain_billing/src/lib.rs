//! Billing Domain - Utility Metering Ledger
//!
//! This crate implements a single-administrator ledger for metered utility
//! billing: meters are registered to owners, bills are issued from meter
//! readings at the meter's rate, anyone may settle a bill, and settled funds
//! are held in custody until the administrator withdraws them.
//!
//! # Components
//!
//! - **Access control**: one fixed administrator gates every mutation
//!   except payment
//! - **Meter registry**: meters with sequential ids, owner index, rate and
//!   active flag
//! - **Bill ledger**: per-meter ordered bills whose amount is fixed at issue
//! - **Payment settlement**: exact-amount settlement with refund of excess
//! - **Fund custody**: pooled balance of settled payments
//!
//! All state lives behind [`BillingService`], which serializes operations
//! and journals a [`BillingEvent`] for each committed mutation. Outbound
//! funds go through a [`FundsTransferPort`].
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{BillingConfig, BillingService, Caller, InMemoryTransferGateway};
//!
//! let service = BillingService::with_system_clock(config, Arc::new(InMemoryTransferGateway::new()));
//!
//! let meter_id = service.register_meter(&admin, owner, "water", rate)?;
//! service.generate_bill(&admin, meter_id, 100)?;
//! service.pay_bill(&Caller::new(owner), meter_id, 0, tendered)?;
//! service.withdraw_funds(&admin)?;
//! ```

pub mod access;
pub mod bill;
pub mod custody;
pub mod error;
pub mod events;
pub mod ledger;
pub mod meter;
pub mod service;
pub mod settlement;
pub mod transfer;

pub use access::{AccessControl, Caller};
pub use bill::{Bill, BillLedger};
pub use custody::{CustodySnapshot, FundCustody};
pub use error::{BillingError, ErrorKind};
pub use events::{BillingEvent, EventEnvelope, EventJournal};
pub use ledger::{AccountSummary, LedgerState, LedgerStats};
pub use meter::{Meter, MeterRegistry, MAX_METER_TYPE_LEN};
pub use service::{BillingConfig, BillingService, WithdrawalReceipt};
pub use settlement::{PaymentReceipt, PaymentSettlement, SettlementPlan};
pub use transfer::{FundsTransferPort, InMemoryTransferGateway, TransferPurpose, TransferReceipt};
