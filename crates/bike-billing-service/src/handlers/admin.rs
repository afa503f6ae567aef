//! Administrative handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::auth::AdminAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Restore response.
#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    /// Number of charges removed.
    pub removed: usize,
}

/// Delete every charge, returning the service to its initial state.
pub async fn restore(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
) -> Result<Json<RestoreResponse>, ApiError> {
    tracing::warn!("Restoring charge store");

    let removed = state.billing.restore()?;

    Ok(Json(RestoreResponse { removed }))
}
