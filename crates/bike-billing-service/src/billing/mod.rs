//! Charge orchestration.
//!
//! [`BillingOrchestrator`] drives every charge through its lifecycle using the
//! collaborator traits in [`ports`].

pub mod locks;
pub mod notification;
pub mod orchestrator;
pub mod ports;

pub use notification::{NotificationReport, CONFIRMATION_SUBJECT};
pub use orchestrator::BillingOrchestrator;
pub use ports::{
    ChargeGateway, GatewayCharge, GatewayError, NotificationError, Notifier,
    PaymentMethodResolver, ResolverError,
};
