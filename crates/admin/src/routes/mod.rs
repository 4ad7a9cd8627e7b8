//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Auth
//! POST /api/login              - Exchange credentials for the token cookie
//! POST /api/logout             - Clear the token cookie
//! GET  /api/auth/status        - Whether the caller holds a valid token
//!
//! # Products
//! GET    /api/products         - Full catalog, inactive included
//! POST   /api/products         - Create (auth required)
//! GET    /api/products/{id}    - One product
//! PUT    /api/products/{id}    - Partial update (auth required)
//! DELETE /api/products/{id}    - Delete (auth required)
//!
//! # Orders (auth required)
//! GET  /api/orders             - All orders, newest first
//! GET  /api/orders/{id}        - One order
//! PUT  /api/orders/{id}        - Change status
//!
//! # Settings
//! GET  /api/settings           - All settings, seeding defaults if empty
//! PUT  /api/settings           - Batch value update (auth required)
//! POST /api/settings/init      - Seed missing defaults (auth required)
//! ```

pub mod auth;
pub mod orders;
pub mod products;
pub mod settings;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the admin API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/auth/status", get(auth::status))
        .route(
            "/api/products",
            get(products::list).post(products::create),
        )
        .route(
            "/api/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/api/orders", get(orders::list))
        .route(
            "/api/orders/{id}",
            get(orders::show).put(orders::update_status),
        )
        .route(
            "/api/settings",
            get(settings::list).put(settings::update),
        )
        .route("/api/settings/init", post(settings::init))
}
