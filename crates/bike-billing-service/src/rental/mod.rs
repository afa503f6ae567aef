//! Biller lookups: payment methods and notification addresses.
//!
//! [`RentalClient`] asks the rental platform; [`StaticResolver`] answers from
//! configuration.

pub mod client;
pub mod static_resolver;

pub use client::RentalClient;
pub use static_resolver::{StaticResolver, StaticResolverError};
