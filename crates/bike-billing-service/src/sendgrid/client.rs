//! SendGrid v3 mail client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::billing::{NotificationError, Notifier};

/// Error type for SendGrid client construction.
#[derive(Debug, thiserror::Error)]
pub enum SendGridError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[derive(Debug, Serialize)]
struct MailSend<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

/// SendGrid API client.
#[derive(Debug, Clone)]
pub struct SendGridClient {
    client: Client,
    api_key: String,
    base_url: String,
    sender: String,
}

impl SendGridClient {
    /// Default SendGrid API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.sendgrid.com/v3";

    /// Create a new SendGrid client.
    ///
    /// # Errors
    ///
    /// Returns `SendGridError::Configuration` if the key or sender is empty,
    /// or the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        sender: impl Into<String>,
    ) -> Result<Self, SendGridError> {
        let api_key = api_key.into();
        let sender = sender.into();
        if api_key.trim().is_empty() {
            return Err(SendGridError::Configuration("API key is empty".into()));
        }
        if sender.trim().is_empty() {
            return Err(SendGridError::Configuration("sender is empty".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| SendGridError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sender,
        })
    }

    /// Address messages are sent from.
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }
}

#[async_trait]
impl Notifier for SendGridClient {
    async fn send(&self, address: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        let mail = MailSend {
            personalizations: [Personalization {
                to: [Address { email: address }],
            }],
            from: Address {
                email: &self.sender,
            },
            subject,
            content: [Content {
                content_type: "text/plain",
                value: body,
            }],
        };

        let response = self
            .client
            .post(format!("{}/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&mail)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(to = %address, "Email accepted by SendGrid");
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(NotificationError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Notifier used when SendGrid is not configured. Logs and succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, address: &str, subject: &str, _body: &str) -> Result<(), NotificationError> {
        tracing::info!(to = %address, subject = %subject, "Email delivery disabled - message logged only");
        Ok(())
    }
}
