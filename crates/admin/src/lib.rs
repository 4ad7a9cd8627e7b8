//! Nonna & Rue's Admin - Back-office JSON API.
//!
//! This crate serves the admin API on port 3001:
//!
//! - Product catalog management (create, update, deactivate, delete)
//! - Order review and status changes
//! - Editable site settings with seeded defaults
//! - Single-operator cookie auth (HS256 token in an `HttpOnly` cookie)
//!
//! It opens the same data directory as the storefront; the two binaries
//! share the document store and nothing else. The crate is a library plus
//! a thin binary so integration tests can build the full router
//! in-process via [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::AdminConfig;
pub use state::AppState;

/// Build the complete admin application.
#[must_use]
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
