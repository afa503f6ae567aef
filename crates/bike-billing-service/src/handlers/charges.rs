//! Charge handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bike_billing_core::{Amount, BillerId, BillingError, Charge, ChargeId, ChargeStatus};

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// New charge request.
///
/// Accepts the rental platform's field names (`ciclista`, `valor`) as well.
#[derive(Debug, Deserialize)]
pub struct ChargeRequest {
    /// Cyclist being charged.
    #[serde(alias = "ciclista")]
    pub biller_id: i64,
    /// Amount as a JSON number, e.g. `49.9`.
    #[serde(alias = "valor")]
    pub amount: serde_json::Number,
}

impl ChargeRequest {
    fn parse(&self) -> Result<(BillerId, Amount), ApiError> {
        let amount: Amount = self.amount.to_string().parse()?;
        Ok((BillerId::new(self.biller_id), amount))
    }
}

/// Charge response.
#[derive(Debug, Serialize)]
pub struct ChargeResponse {
    /// Charge ID.
    pub id: String,
    /// Cyclist being charged.
    pub biller_id: i64,
    /// Amount.
    pub amount: Amount,
    /// Current status.
    pub status: ChargeStatus,
    /// When the charge was requested.
    pub requested_at: DateTime<Utc>,
    /// When the charge left the queue.
    pub settled_at: Option<DateTime<Utc>>,
}

impl From<Charge> for ChargeResponse {
    fn from(charge: Charge) -> Self {
        Self {
            id: charge.id.to_string(),
            biller_id: charge.biller_id.get(),
            amount: charge.amount,
            status: charge.status,
            requested_at: charge.requested_at,
            settled_at: charge.settled_at,
        }
    }
}

/// Queue processing response.
#[derive(Debug, Serialize)]
pub struct ProcessQueueResponse {
    /// Number of charges paid in this run.
    pub paid_count: usize,
    /// The charges paid in this run.
    pub paid: Vec<ChargeResponse>,
}

/// Create a charge and settle it immediately.
///
/// The response carries the terminal charge: `PAID` or `FAILED`. If the charge
/// was created but could not be settled, the error body carries its
/// `charge_id` and the charge stays queued for the next run.
pub async fn create_charge(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<ChargeRequest>,
) -> Result<Json<ChargeResponse>, ApiError> {
    let (biller_id, amount) = body.parse()?;

    let charge = state.billing.enqueue(biller_id, amount)?;
    let charge_id = charge.id;

    // Settlement runs to completion even if the request is dropped.
    let billing = Arc::clone(&state.billing);
    let settled = tokio::spawn(async move { billing.settle(&charge_id).await })
        .await
        .map_err(|e| ApiError::Internal(format!("settlement task failed: {e}")))
        .and_then(|result| result.map_err(ApiError::from))
        .map_err(|e| {
            tracing::warn!(charge_id = %charge_id, error = %e, "Charge created but not settled");
            e.queued(charge_id)
        })?;

    Ok(Json(settled.into()))
}

/// Put a charge in the queue without attempting it.
pub async fn enqueue_charge(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<ChargeRequest>,
) -> Result<Json<ChargeResponse>, ApiError> {
    let (biller_id, amount) = body.parse()?;

    let charge = state.billing.enqueue(biller_id, amount)?;

    Ok(Json(charge.into()))
}

/// Get a charge by ID.
pub async fn get_charge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ChargeResponse>, ApiError> {
    let charge_id: ChargeId = id.parse().map_err(BillingError::from)?;

    let charge = state.billing.get(&charge_id)?;

    Ok(Json(charge.into()))
}

/// Attempt every queued charge.
///
/// The run continues in the background if the request is dropped.
pub async fn process_queue(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProcessQueueResponse>, ApiError> {
    let billing = Arc::clone(&state.billing);
    let paid = tokio::spawn(async move { billing.process_queue().await })
        .await
        .map_err(|e| ApiError::Internal(format!("queue run failed: {e}")))??;

    Ok(Json(ProcessQueueResponse {
        paid_count: paid.len(),
        paid: paid.into_iter().map(ChargeResponse::from).collect(),
    }))
}
