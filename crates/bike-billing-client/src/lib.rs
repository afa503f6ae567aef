//! Bike-billing client SDK.
//!
//! This crate provides a client library for platform services to enqueue
//! charges, settle them and follow their status.
//!
//! # Example
//!
//! ```no_run
//! use bike_billing_client::BillingClient;
//! use bike_billing_core::{Amount, BillerId};
//!
//! # async fn example() -> Result<(), bike_billing_client::ClientError> {
//! let client = BillingClient::new("http://bike-billing:8080")?;
//!
//! // Charge a finished rental right away
//! let charge = client
//!     .create_charge(BillerId::new(7), "49.90".parse().unwrap())
//!     .await?;
//! println!("Charge {} is {}", charge.id, charge.status);
//!
//! // Or leave it for the next queue run
//! let queued = client.enqueue_charge(BillerId::new(7), Amount::from_cents(1000)?).await?;
//! let report = client.process_queue().await?;
//! println!("{} charges paid, {} pending", report.paid_count, queued.status);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{BillingClient, ClientOptions};
pub use error::ClientError;
pub use types::*;
