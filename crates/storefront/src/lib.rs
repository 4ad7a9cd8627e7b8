//! Nonna & Rue's Storefront - Public shop site.
//!
//! This crate serves the public-facing storefront on port 3000:
//!
//! - Axum web framework with HTMX for interactivity
//! - Askama templates for server-side rendering
//! - The flat-file document store for catalog, orders, and site settings
//! - tower-sessions as the shopper's durable cart storage
//!
//! The crate is a library plus a thin binary so integration tests can
//! build the full router in-process via [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::StorefrontConfig;
pub use state::AppState;

/// Build the complete storefront application.
#[must_use]
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new("crates/storefront/static"))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the data directory is still reachable before returning OK.
/// Returns 503 Service Unavailable otherwise.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match tokio::fs::metadata(&state.config().data_dir).await {
        Ok(meta) if meta.is_dir() => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    }
}
