//! Core types for the bike-rental billing service.
//!
//! This crate provides the foundational types shared by the store, the service and
//! the client SDK:
//!
//! - **Identifiers**: `ChargeId`, `BillerId`
//! - **Charges**: `Charge`, `ChargeStatus`, `SettlementOutcome`
//! - **Money**: `Amount`
//! - **Cards**: `CardDetails`, `CardError`
//!
//! # Amounts
//!
//! Amounts are positive decimals in the platform currency with at most two decimal
//! places, so that `amount * 100` is always a whole number of cents. The gateway is
//! always called with that integer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod amount;
pub mod card;
pub mod charge;
pub mod error;
pub mod ids;

pub use amount::Amount;
pub use card::{CardDetails, CardError, ValidatedCard};
pub use charge::{Charge, ChargeStatus, SettlementOutcome};
pub use error::{BillingError, Result};
pub use ids::{BillerId, ChargeId, IdError};
