//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, cards, charges, email, health};
use crate::state::AppState;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Queue runs are long and sequential; one at a time is enough.
const QUEUE_MAX_CONCURRENT_REQUESTS: usize = 1;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Charges
///
/// Settling routes use `settlement_timeout_seconds`; the rest use
/// `request_timeout_seconds`.
///
/// - `POST /v1/charges` - Create a charge and settle it now
/// - `POST /v1/charges/queue` - Enqueue a charge
/// - `POST /v1/charges/queue/process` - Attempt every queued charge
/// - `GET /v1/charges/:id` - Get a charge
///
/// ## Utilities
/// - `POST /v1/cards/validate` - Validate card fields
/// - `POST /v1/email` - Send an email
///
/// ## Admin (`X-Admin-Key` auth)
/// - `POST /v1/admin/restore` - Delete every charge
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = Duration::from_secs(state.config.request_timeout_seconds);
    let settlement_timeout = Duration::from_secs(state.config.settlement_timeout_seconds);

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    // Routes that call the resolver and the gateway get the longer timeout.
    let settlement_routes = Router::new()
        .route("/charges", post(charges::create_charge))
        .route(
            "/charges/queue/process",
            post(charges::process_queue)
                .layer(ConcurrencyLimitLayer::new(QUEUE_MAX_CONCURRENT_REQUESTS)),
        )
        .layer(TimeoutLayer::new(settlement_timeout));

    let api_routes = Router::new()
        // Charges
        .route("/charges/queue", post(charges::enqueue_charge))
        .route("/charges/:id", get(charges::get_charge))
        // Utilities
        .route("/cards/validate", post(cards::validate_card))
        .route("/email", post(email::send_email))
        // Admin
        .route("/admin/restore", post(admin::restore))
        .layer(TimeoutLayer::new(request_timeout))
        .merge(settlement_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .nest("/v1", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
