//! Bike-billing HTTP API service.
//!
//! This crate provides the charge orchestration core and its HTTP API:
//!
//! - Charge creation, immediate settlement and lookup
//! - The pending-charge queue and its processing run
//! - Payment notifications by email
//! - Card field validation
//!
//! # Collaborators
//!
//! The orchestrator reaches the outside world only through the traits in
//! [`billing::ports`]. Production wiring uses Stripe for payments, SendGrid for
//! email and the rental platform (or a static table) for biller lookups.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for the router

pub mod auth;
pub mod billing;
pub mod config;
pub mod error;
pub mod handlers;
pub mod rental;
pub mod routes;
pub mod sendgrid;
pub mod state;
pub mod stripe;

pub use billing::{
    BillingOrchestrator, ChargeGateway, GatewayCharge, GatewayError, NotificationError, Notifier,
    PaymentMethodResolver, ResolverError,
};
pub use config::ServiceConfig;
pub use error::ApiError;
pub use rental::{RentalClient, StaticResolver};
pub use routes::create_router;
pub use sendgrid::{LogNotifier, SendGridClient};
pub use state::AppState;
pub use stripe::{StripeClient, StripeError, UnconfiguredGateway};
