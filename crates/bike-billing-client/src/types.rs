//! Request and response types for the bike-billing client.

use bike_billing_core::{Amount, BillerId, Charge};
use serde::{Deserialize, Serialize};

/// New charge request.
#[derive(Debug, Clone, Serialize)]
pub struct NewChargeRequest {
    /// Cyclist being charged.
    pub biller_id: BillerId,
    /// Amount to collect.
    pub amount: Amount,
}

/// Result of a queue processing run.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessQueueResponse {
    /// Number of charges paid in the run.
    pub paid_count: usize,
    /// The charges paid in the run.
    pub paid: Vec<Charge>,
}

/// Card validation request.
#[derive(Debug, Clone, Serialize)]
pub struct CardRequest {
    /// Name printed on the card.
    pub holder_name: String,
    /// Card number.
    pub number: String,
    /// Expiry date.
    pub expiry: String,
    /// Security code.
    pub cvv: String,
}

/// Card validation response.
#[derive(Debug, Clone, Deserialize)]
pub struct CardResponse {
    /// Whether the card passed validation.
    pub valid: bool,
    /// Last four digits.
    pub last4: String,
    /// Expiry as `YYYY-MM`.
    pub expiry: String,
}

/// Email request.
#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    /// Destination address.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub message: String,
}

/// Email response.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailResponse {
    /// Whether the provider accepted the message.
    pub sent: bool,
    /// Destination address.
    pub recipient: String,
}

/// Restore response.
#[derive(Debug, Clone, Deserialize)]
pub struct RestoreResponse {
    /// Number of charges removed.
    pub removed: usize,
}

/// API error response from the server.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorDetail,
}

/// API error detail.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
    /// Charge left queued by a create that could not settle.
    #[serde(default)]
    pub charge_id: Option<String>,
}
