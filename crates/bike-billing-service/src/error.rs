//! API error types and responses.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use bike_billing_core::{BillingError, ChargeId};

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden - the operation is disabled for every caller.
    #[error("forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Request failed validation.
    #[error("{message}")]
    Validation {
        /// Machine-readable error code.
        code: &'static str,
        /// Human-readable message.
        message: String,
    },

    /// Conflict - invalid state transition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// External service error.
    #[error("external service error: {0}")]
    ExternalService(String),

    /// A charge was created but settling it failed. It stays queued.
    #[error("{cause} (charge {charge_id} left queued)")]
    ChargeQueued {
        /// The charge left in the queue.
        charge_id: String,
        /// Why settlement failed.
        cause: Box<ApiError>,
    },
}

impl ApiError {
    /// Shorthand for a validation failure.
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    /// Attach the charge a failed create left in the queue.
    #[must_use]
    pub fn queued(self, charge_id: ChargeId) -> Self {
        Self::ChargeQueued {
            charge_id: charge_id.to_string(),
            cause: Box::new(self),
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Self::Validation { code, message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, *code, message.clone())
            }
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            Self::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                "external_service_error",
                msg.clone(),
            ),
            Self::ChargeQueued { cause, .. } => cause.parts(),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    charge_id: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let charge_id = match self {
            Self::ChargeQueued { charge_id, .. } => Some(charge_id),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                charge_id,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::ChargeNotFound { charge_id } => {
                Self::NotFound(format!("charge not found: {charge_id}"))
            }
            e @ BillingError::ChargeAlreadySettled { .. } => Self::Conflict(e.to_string()),
            BillingError::InvalidAmount(msg) => Self::validation("invalid_amount", msg),
            BillingError::InvalidCard(card) => Self::validation(card.code(), card.to_string()),
            BillingError::InvalidId(e) => Self::validation("invalid_id", e.to_string()),
            BillingError::PaymentMethod(msg) => Self::ExternalService(msg),
            BillingError::Storage(msg) => Self::Internal(msg),
        }
    }
}

/// JSON body extractor that reports malformed bodies as [`ApiError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(JsonRejection::JsonDataError(e)) => {
                Err(ApiError::validation("validation_error", e.body_text()))
            }
            Err(e) => Err(ApiError::validation("malformed_json", e.body_text())),
        }
    }
}
