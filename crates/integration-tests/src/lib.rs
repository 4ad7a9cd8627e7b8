//! Integration test harness for Nonna & Rue's.
//!
//! Both binaries are libraries plus thin `main`s, so the tests build the
//! real routers and drive them in-process with `tower::ServiceExt::oneshot`.
//! Every harness gets its own throwaway data directory; nothing external
//! is required to run these tests.

// This crate exists only to support tests; panicking helpers keep them terse.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::str::FromStr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use secrecy::SecretString;
use tower::ServiceExt;

use nonna_rues_admin::AdminConfig;
use nonna_rues_core::{Product, ProductImage};
use nonna_rues_db::{Database, test_support::temp_data_dir};
use nonna_rues_storefront::StorefrontConfig;

/// Credentials every admin harness is configured with.
pub const ADMIN_USERNAME: &str = "nonna";
pub const ADMIN_PASSWORD: &str = "gumbo-on-sundays";
const ADMIN_TOKEN_SECRET: &str = "kP9$mQ2!xT7@vB4#nW6%jR8^hL3&cF5*";

/// A storefront router over its own data directory.
pub struct Storefront {
    pub app: Router,
    pub db: Database,
}

/// Build a storefront with a fast gateway and a generous timeout.
pub async fn storefront() -> Storefront {
    storefront_with(Duration::from_millis(25), Duration::from_secs(2)).await
}

/// Build a storefront with explicit gateway timing, for the failure paths.
pub async fn storefront_with(gateway_delay: Duration, submit_timeout: Duration) -> Storefront {
    let data_dir = temp_data_dir();
    let db = Database::open(&data_dir).await.unwrap();
    db.settings.init_defaults().await.unwrap();

    let config = StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        data_dir,
        submit_timeout,
        gateway_delay,
    };
    let state = nonna_rues_storefront::AppState::new(config, db.clone());
    Storefront {
        app: nonna_rues_storefront::app(state),
        db,
    }
}

/// An admin router over its own data directory.
pub struct Admin {
    pub app: Router,
    pub db: Database,
}

/// Build an admin API with the harness credentials.
pub async fn admin() -> Admin {
    let data_dir = temp_data_dir();
    let db = Database::open(&data_dir).await.unwrap();

    let config = AdminConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:3001".to_string(),
        data_dir,
        username: ADMIN_USERNAME.to_string(),
        password: SecretString::from(ADMIN_PASSWORD),
        token_secret: SecretString::from(ADMIN_TOKEN_SECRET),
    };
    let state = nonna_rues_admin::AppState::new(config, db.clone());
    Admin {
        app: nonna_rues_admin::app(state),
        db,
    }
}

/// Seed one active product and return it.
pub async fn seed_product(db: &Database, title: &str, price: &str) -> Product {
    db.products
        .create(Product::new(
            title.to_string(),
            format!("{title}, lovingly sourced."),
            Decimal::from_str(price).unwrap(),
            vec![ProductImage {
                url: format!("/images/{}.jpg", title.to_lowercase().replace(' ', "-")),
                alt: title.to_string(),
            }],
            None,
        ))
        .await
        .unwrap()
}

// =============================================================================
// Request plumbing
// =============================================================================

/// Drive one request through the router.
pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

/// Build a GET request, optionally with a cookie.
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    with_cookie(Request::builder().uri(uri), cookie)
        .body(Body::empty())
        .unwrap()
}

/// Build a form POST, optionally with a cookie.
pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    with_cookie(Request::builder().method("POST").uri(uri), cookie)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a JSON request with the given method.
pub fn json_request(
    method: &str,
    uri: &str,
    body: &serde_json::Value,
    cookie: Option<&str>,
) -> Request<Body> {
    with_cookie(Request::builder().method(method).uri(uri), cookie)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a DELETE request, optionally with a cookie.
pub fn delete(uri: &str, cookie: Option<&str>) -> Request<Body> {
    with_cookie(Request::builder().method("DELETE").uri(uri), cookie)
        .body(Body::empty())
        .unwrap()
}

fn with_cookie(
    builder: axum::http::request::Builder,
    cookie: Option<&str>,
) -> axum::http::request::Builder {
    match cookie {
        Some(value) => builder.header(COOKIE, value),
        None => builder,
    }
}

/// The `name=value` part of the response's first `Set-Cookie` header.
pub fn cookie_from(response: &Response<Body>) -> Option<String> {
    let raw = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    raw.split(';').next().map(str::to_owned)
}

/// Collect the response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Collect the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let text = body_text(response).await;
    serde_json::from_str(&text).unwrap()
}
