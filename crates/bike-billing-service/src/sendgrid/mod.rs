//! SendGrid integration for payment notifications.

pub mod client;

pub use client::{LogNotifier, SendGridClient, SendGridError};
