//! Rental platform API client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use bike_billing_core::BillerId;

use crate::billing::{PaymentMethodResolver, ResolverError};

/// Stripe test cards the rental platform may hold, mapped to the matching
/// Stripe test payment methods.
const TEST_CARD_PAYMENT_METHODS: &[(&str, &str)] = &[
    ("4242424242424242", "pm_card_visa"),
    ("4000000000000002", "pm_card_visa_chargeDeclined"),
];

/// Card on file, as returned by `GET /cartaoDeCredito/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CardOnFile {
    /// Card number.
    #[serde(default, rename = "numero")]
    pub number: Option<String>,
}

/// Cyclist profile, as returned by `GET /ciclista/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Cyclist {
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Client for the rental platform's cyclist and card endpoints.
#[derive(Debug, Clone)]
pub struct RentalClient {
    client: Client,
    base_url: String,
    default_payment_method: String,
}

impl RentalClient {
    /// Upper bound on a single lookup.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a new rental platform client.
    ///
    /// `default_payment_method` is charged for cyclists whose card on file is
    /// not one of the known test cards.
    ///
    /// # Errors
    ///
    /// Returns `ResolverError::Unavailable` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        default_payment_method: impl Into<String>,
    ) -> Result<Self, ResolverError> {
        let client = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ResolverError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_payment_method: default_payment_method.into(),
        })
    }

    /// Fetch the cyclist's card on file. `None` when the platform has none.
    ///
    /// # Errors
    ///
    /// Returns `ResolverError::Unavailable` on transport errors or any
    /// non-404 failure status.
    pub async fn get_card(&self, biller_id: BillerId) -> Result<Option<CardOnFile>, ResolverError> {
        self.get_optional(&format!("{}/cartaoDeCredito/{biller_id}", self.base_url))
            .await
    }

    /// Fetch the cyclist profile. `None` when the cyclist does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ResolverError::Unavailable` on transport errors or any
    /// non-404 failure status.
    pub async fn get_cyclist(&self, biller_id: BillerId) -> Result<Option<Cyclist>, ResolverError> {
        self.get_optional(&format!("{}/ciclista/{biller_id}", self.base_url))
            .await
    }

    async fn get_optional<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, ResolverError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ResolverError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Rental platform request failed");
            return Err(ResolverError::Unavailable(format!("HTTP {status}")));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| ResolverError::Unavailable(e.to_string()))
    }

    fn payment_method_for(&self, card: &CardOnFile) -> String {
        let number: Option<String> = card
            .number
            .as_deref()
            .map(|n| n.chars().filter(|c| *c != ' ').collect());

        number
            .and_then(|n| {
                TEST_CARD_PAYMENT_METHODS
                    .iter()
                    .find(|(card, _)| *card == n)
                    .map(|(_, pm)| (*pm).to_string())
            })
            .unwrap_or_else(|| self.default_payment_method.clone())
    }
}

#[async_trait]
impl PaymentMethodResolver for RentalClient {
    async fn resolve_payment_method(
        &self,
        biller_id: BillerId,
    ) -> Result<Option<String>, ResolverError> {
        Ok(self
            .get_card(biller_id)
            .await?
            .map(|card| self.payment_method_for(&card)))
    }

    async fn resolve_notification_address(
        &self,
        biller_id: BillerId,
    ) -> Result<Option<String>, ResolverError> {
        Ok(self
            .get_cyclist(biller_id)
            .await?
            .and_then(|cyclist| cyclist.email)
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty()))
    }
}
