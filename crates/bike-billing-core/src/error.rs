//! Error types for the billing core.

use crate::card::CardError;
use crate::ids::IdError;
use crate::ChargeStatus;

/// Result type for billing operations.
pub type Result<T> = std::result::Result<T, BillingError>;

/// Errors that cross the billing core's boundary.
///
/// Payment-domain failures (declined cards, gateway outages, missing payment
/// methods) are not errors: they are recorded in the charge's status.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    /// Charge not found.
    #[error("charge not found: {charge_id}")]
    ChargeNotFound {
        /// The charge ID that was not found.
        charge_id: String,
    },

    /// The charge already left the queue and cannot be settled again.
    #[error("charge {charge_id} is already {status}")]
    ChargeAlreadySettled {
        /// The charge ID.
        charge_id: String,
        /// Its current status.
        status: ChargeStatus,
    },

    /// Invalid amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid card details.
    #[error("invalid card: {0}")]
    InvalidCard(#[from] CardError),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// Payment-method lookup failed in an unexpected way.
    #[error("payment method lookup failed: {0}")]
    PaymentMethod(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),
}
