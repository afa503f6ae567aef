//! Card validation handler.

use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use bike_billing_core::{BillingError, CardDetails};

use crate::error::{ApiError, ApiJson};

/// Card validation request.
#[derive(Debug, Deserialize)]
pub struct CardRequest {
    /// Name printed on the card.
    #[serde(alias = "nomeTitular")]
    pub holder_name: String,
    /// Card number.
    #[serde(alias = "numero")]
    pub number: String,
    /// Expiry date.
    #[serde(alias = "validade")]
    pub expiry: String,
    /// Security code.
    pub cvv: String,
}

/// Card validation response.
#[derive(Debug, Serialize)]
pub struct CardResponse {
    /// Always `true`; invalid cards are rejected with 422.
    pub valid: bool,
    /// Last four digits of the number.
    pub last4: String,
    /// Expiry as `YYYY-MM`.
    pub expiry: String,
}

/// Validate card fields without storing or charging anything.
pub async fn validate_card(
    ApiJson(body): ApiJson<CardRequest>,
) -> Result<Json<CardResponse>, ApiError> {
    let details = CardDetails {
        holder_name: body.holder_name,
        number: body.number,
        expiry: body.expiry,
        cvv: body.cvv,
    };

    let card = details
        .validate(Utc::now().date_naive())
        .map_err(BillingError::from)?;

    tracing::debug!(last4 = %card.last4(), "Card validated");

    Ok(Json(CardResponse {
        valid: true,
        last4: card.last4().to_string(),
        expiry: format!("{:04}-{:02}", card.expiry_year, card.expiry_month),
    }))
}
