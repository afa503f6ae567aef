//! Stripe integration for collecting charges.
//!
//! Each charge is a single confirmed, off-session `PaymentIntent` against a
//! payment method the rental platform already holds for the cyclist.

pub mod client;
pub mod types;

pub use client::{StripeClient, StripeError, UnconfiguredGateway};
pub use types::*;
