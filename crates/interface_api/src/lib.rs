//! HTTP API Layer
//!
//! This crate exposes the utility-billing ledger over REST using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers per ledger component
//! - **Middleware**: Authentication, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: `BillingError` mapped onto consistent JSON errors
//!
//! The bearer token identifies the caller; authorization is enforced by the
//! ledger on every call, not by the router.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(service, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_billing::BillingService;

use crate::config::ApiConfig;
use crate::handlers::{bills, custody, health, ledger, meters, parties};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BillingService>,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `service` - The billing ledger
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(service: Arc<BillingService>, config: ApiConfig) -> Router {
    let state = AppState { service, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Meter routes
    let meter_routes = Router::new()
        .route("/", post(meters::register_meter).get(meters::list_meters))
        .route("/:id", get(meters::get_meter))
        .route("/:id/rate", put(meters::update_rate))
        .route("/:id/toggle", post(meters::toggle_status))
        .route("/:id/bills", get(bills::list_bills).post(bills::generate_bill))
        .route("/:id/bills/:index", get(bills::get_bill))
        .route("/:id/bills/:index/pay", post(bills::pay_bill));

    // Party routes
    let party_routes = Router::new()
        .route("/:id/meters", get(parties::list_party_meters))
        .route("/:id/summary", get(parties::account_summary));

    // Custody routes
    let custody_routes = Router::new()
        .route("/", get(custody::get_custody))
        .route("/withdraw", post(custody::withdraw));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/meters", meter_routes)
        .nest("/parties", party_routes)
        .nest("/custody", custody_routes)
        .route("/stats", get(ledger::stats))
        .route("/events", get(ledger::list_events))
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
