//! HTTP route handlers for the API server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (verifies database)
//!
//! # Couriers
//! GET  /api/couriers                - Partner registry with active flags
//! POST /api/couriers/quotes         - Rate comparison across active partners
//!
//! # Orders
//! POST /api/orders                  - Create order
//! GET  /api/orders?user_id=N        - List a user's orders
//! GET  /api/orders/{id}             - Order detail
//! POST /api/orders/{id}/status      - Status transition (+ audit log)
//! POST /api/orders/{id}/cancel      - Cancel (409 once shipped)
//!
//! # Addresses
//! GET  /api/addresses?user_id=N     - Address book
//! POST /api/addresses               - Create address
//! PUT  /api/addresses/{id}          - Update address
//! DELETE /api/addresses/{id}?user_id=N - Delete address
//!
//! # Payments
//! POST /api/payments/create         - Create payment + gateway order
//! POST /api/payments/verify         - Checkout callback signature verification
//! POST /api/payments/webhook        - Gateway webhook (HMAC-verified, no bearer token)
//!
//! # Tracking
//! GET  /api/tracking/{order_id}          - Local tracking timeline
//! GET  /api/tracking/enhanced/{order_id} - Merged live + local timeline
//! ```
//!
//! All `/api` routes except the webhook sit behind the service-token layer;
//! the webhook authenticates via its HMAC signature instead.

pub mod addresses;
pub mod couriers;
pub mod orders;
pub mod payments;
pub mod tracking;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::middleware::require_service_token;
use crate::state::AppState;

/// Create the courier routes router.
pub fn courier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(couriers::list_partners))
        .route("/quotes", post(couriers::quotes))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::list))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
        .route("/{id}/cancel", post(orders::cancel))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::list).post(addresses::create))
        .route(
            "/{id}",
            put(addresses::update).delete(addresses::delete),
        )
}

/// Create the tracking routes router.
pub fn tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/{order_id}", get(tracking::local))
        .route("/enhanced/{order_id}", get(tracking::enhanced))
}

/// Create all `/api` routes.
pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/couriers", courier_routes())
        .nest("/orders", order_routes())
        .nest("/addresses", address_routes())
        .nest("/tracking", tracking_routes())
        .route("/payments/create", post(payments::create))
        .route("/payments/verify", post(payments::verify))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_service_token,
        ));

    // The webhook authenticates via HMAC over the raw body, not the bearer token
    let public = Router::new().route("/payments/webhook", post(payments::webhook));

    Router::new().nest("/api", protected.merge(public))
}
