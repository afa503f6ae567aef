//! Stripe API types.

use serde::Deserialize;

/// Stripe `PaymentIntent` object.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    /// Payment intent ID.
    pub id: String,
    /// Amount in cents.
    #[serde(default)]
    pub amount: i64,
    /// Currency (e.g., "brl").
    #[serde(default)]
    pub currency: String,
    /// Status (succeeded, processing, `requires_action`, etc.).
    #[serde(default)]
    pub status: String,
    /// Payment method used.
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Created timestamp (Unix).
    #[serde(default)]
    pub created: i64,
}

/// Stripe API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    /// Error details.
    pub error: StripeErrorDetail,
}

/// Stripe error detail.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorDetail {
    /// Error type (`card_error`, `invalid_request_error`, `api_error`, ...).
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message.
    #[serde(default)]
    pub message: String,
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Decline code for card errors.
    #[serde(default)]
    pub decline_code: Option<String>,
}

impl StripeErrorDetail {
    /// Whether this is a card-level decline rather than a request problem.
    #[must_use]
    pub fn is_card_error(&self) -> bool {
        self.error_type == "card_error"
    }
}
