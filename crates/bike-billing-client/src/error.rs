//! Client error types.

/// Errors that can occur when using the bike-billing client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
        /// Charge the request created before failing, if any.
        charge_id: Option<String>,
    },

    /// Charge not found.
    #[error("charge not found: {message}")]
    ChargeNotFound {
        /// Server message.
        message: String,
    },

    /// The charge already left the queue.
    #[error("charge already settled: {message}")]
    ChargeAlreadySettled {
        /// Server message.
        message: String,
    },

    /// The request was rejected by validation.
    #[error("validation failed: {code} - {message}")]
    Validation {
        /// Error code, e.g. `invalid_amount` or `cvv_invalid`.
        code: String,
        /// Error message.
        message: String,
    },

    /// Invalid input on the client side.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] bike_billing_core::BillingError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
