//! Stripe API client implementation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::types::{PaymentIntent, StripeErrorResponse};
use crate::billing::{ChargeGateway, GatewayCharge, GatewayError};

/// Error type for Stripe operations.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe API returned an error.
    #[error("Stripe API error: {error_type} - {message}")]
    Api {
        /// Error type.
        error_type: String,
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<StripeError> for GatewayError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::Api {
                error_type,
                message,
                code,
            } if error_type == "card_error" => Self::CardDeclined { message, code },
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// Stripe API client.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    api_key: String,
    base_url: String,
    currency: String,
}

impl StripeClient {
    /// Default Stripe API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.stripe.com/v1";

    /// Upper bound on a single charge attempt.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new Stripe client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Stripe secret API key (`sk_test_...` or `sk_live_...`)
    /// * `base_url` - API root, normally [`Self::DEFAULT_BASE_URL`]
    /// * `currency` - ISO currency code every charge is made in
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Configuration` if the key is empty or the HTTP
    /// client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        currency: impl Into<String>,
    ) -> Result<Self, StripeError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(StripeError::Configuration("API key is empty".into()));
        }

        let client = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StripeError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            currency: currency.into().to_lowercase(),
        })
    }

    /// Currency charges are made in.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Create and confirm an off-session payment intent.
    ///
    /// # Arguments
    ///
    /// * `amount_cents` - Amount to charge in the smallest currency unit
    /// * `payment_method` - Stripe payment method ID (e.g. `pm_card_visa`)
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Api` if Stripe rejects the request (including
    /// card declines) and `StripeError::Http` on transport failures.
    pub async fn create_payment_intent(
        &self,
        amount_cents: i64,
        payment_method: &str,
    ) -> Result<PaymentIntent, StripeError> {
        let params = [
            ("amount", amount_cents.to_string()),
            ("currency", self.currency.clone()),
            ("payment_method", payment_method.to_string()),
            ("confirm", "true".to_string()),
            ("off_session", "true".to_string()),
        ];

        tracing::debug!(
            amount_cents = %amount_cents,
            currency = %self.currency,
            "Creating Stripe payment intent"
        );

        let response = self
            .client
            .post(format!("{}/payment_intents", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(&params)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<StripeErrorResponse, _> = response.json().await;

        match error_body {
            Ok(stripe_error) => Err(StripeError::Api {
                error_type: stripe_error.error.error_type,
                message: stripe_error.error.message,
                code: stripe_error.error.code,
            }),
            Err(_) => Err(StripeError::Api {
                error_type: "unknown".to_string(),
                message: format!("HTTP {status}"),
                code: None,
            }),
        }
    }
}

#[async_trait]
impl ChargeGateway for StripeClient {
    async fn charge(
        &self,
        amount_cents: i64,
        payment_method: &str,
    ) -> Result<GatewayCharge, GatewayError> {
        let intent = self
            .create_payment_intent(amount_cents, payment_method)
            .await?;
        Ok(GatewayCharge {
            id: intent.id,
            status: intent.status,
        })
    }
}

/// Gateway used when no Stripe key is configured. Every attempt fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGateway;

#[async_trait]
impl ChargeGateway for UnconfiguredGateway {
    async fn charge(
        &self,
        _amount_cents: i64,
        _payment_method: &str,
    ) -> Result<GatewayCharge, GatewayError> {
        Err(GatewayError::Unavailable(
            "payment gateway is not configured".into(),
        ))
    }
}
