//! Email handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// Email request.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    /// Destination address.
    #[serde(alias = "destinatario")]
    pub recipient: String,
    /// Subject line.
    #[serde(alias = "assunto")]
    pub subject: String,
    /// Plain-text body.
    #[serde(alias = "mensagem")]
    pub message: String,
}

/// Email response.
#[derive(Debug, Serialize)]
pub struct EmailResponse {
    /// Whether the provider accepted the message.
    pub sent: bool,
    /// Destination address.
    pub recipient: String,
}

/// Send an email through the configured notifier.
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<EmailRequest>,
) -> Result<Json<EmailResponse>, ApiError> {
    let recipient = body.recipient.trim();
    if !is_valid_address(recipient) {
        return Err(ApiError::validation(
            "invalid_email",
            format!("invalid email address: {recipient:?}"),
        ));
    }

    state
        .notifier
        .send(recipient, &body.subject, &body.message)
        .await
        .map_err(|e| {
            tracing::warn!(to = %recipient, error = %e, "Email delivery failed");
            ApiError::ExternalService(e.to_string())
        })?;

    Ok(Json(EmailResponse {
        sent: true,
        recipient: recipient.to_string(),
    }))
}

/// Syntactic address check: `local@domain.tld`, no whitespace.
fn is_valid_address(address: &str) -> bool {
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || address.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !host.starts_with('.') && tld.len() >= 2
}
