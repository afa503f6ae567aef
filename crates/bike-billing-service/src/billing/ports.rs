//! Collaborator interfaces the orchestrator depends on.
//!
//! Concrete implementations live in [`crate::stripe`], [`crate::sendgrid`] and
//! [`crate::rental`]; tests substitute their own.

use async_trait::async_trait;

use bike_billing_core::{BillerId, BillingError};

/// Gateway status string for a successful charge.
pub const STATUS_SUCCEEDED: &str = "succeeded";

/// Result of a single gateway charge attempt that reached a terminal answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCharge {
    /// Gateway-side identifier of the attempt.
    pub id: String,
    /// Gateway status, e.g. `succeeded`, `requires_action`, `canceled`.
    pub status: String,
}

impl GatewayCharge {
    /// Whether the gateway reported the money as collected.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status == STATUS_SUCCEEDED
    }
}

/// Errors raised by a charge gateway.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The card was declined.
    #[error("card declined: {message}")]
    CardDeclined {
        /// Gateway decline message.
        message: String,
        /// Gateway decline code, if any.
        code: Option<String>,
    },

    /// The gateway could not be reached or rejected the request.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Performs charge attempts against a payment gateway.
#[async_trait]
pub trait ChargeGateway: Send + Sync {
    /// Attempt to collect `amount_cents` using `payment_method`.
    async fn charge(
        &self,
        amount_cents: i64,
        payment_method: &str,
    ) -> Result<GatewayCharge, GatewayError>;
}

/// Errors raised when looking up biller data.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolverError {
    /// The lookup service failed for a reason other than "not found".
    #[error("biller lookup unavailable: {0}")]
    Unavailable(String),
}

impl From<ResolverError> for BillingError {
    fn from(err: ResolverError) -> Self {
        Self::PaymentMethod(err.to_string())
    }
}

/// Maps billers to payment methods and notification addresses.
///
/// `Ok(None)` means "the biller has none": an expected business outcome.
/// `Err` is reserved for lookups that could not be answered.
#[async_trait]
pub trait PaymentMethodResolver: Send + Sync {
    /// Payment-method reference to charge for `biller_id`.
    async fn resolve_payment_method(
        &self,
        biller_id: BillerId,
    ) -> Result<Option<String>, ResolverError>;

    /// Email address to notify for `biller_id`.
    async fn resolve_notification_address(
        &self,
        biller_id: BillerId,
    ) -> Result<Option<String>, ResolverError>;
}

/// Errors raised by a notifier.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    /// The message could not be delivered to the provider.
    #[error("notification transport error: {0}")]
    Transport(String),

    /// The provider refused the message.
    #[error("notification rejected ({status}): {message}")]
    Rejected {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider message.
        message: String,
    },
}

/// Sends messages to billers.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a plain-text message.
    async fn send(&self, address: &str, subject: &str, body: &str)
        -> Result<(), NotificationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_succeeded_counts_as_paid() {
        let charge = |status: &str| GatewayCharge {
            id: "pi_1".into(),
            status: status.into(),
        };
        assert!(charge("succeeded").succeeded());
        assert!(!charge("requires_action").succeeded());
        assert!(!charge("canceled").succeeded());
        assert!(!charge("SUCCEEDED").succeeded());
    }
}
