//! Login, logout, and auth status.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::error::{ApiError, Result};
use crate::middleware::auth::token_from_cookies;
use crate::services::auth::{ADMIN_TOKEN_COOKIE, TOKEN_TTL_SECONDS};
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Exchange credentials for the `HttpOnly` token cookie.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response> {
    state
        .auth()
        .verify_credentials(&request.username, &request.password)
        .map_err(|err| {
            tracing::info!(username = %request.username, error = %err, "login rejected");
            ApiError::Unauthorized
        })?;

    let token = state
        .auth()
        .issue_token()
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let cookie = format!(
        "{ADMIN_TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={TOKEN_TTL_SECONDS}"
    );
    tracing::info!(username = %request.username, "admin logged in");
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "status": "ok" })),
    )
        .into_response())
}

/// Clear the token cookie.
#[instrument(skip_all)]
pub async fn logout() -> Response {
    let cookie = format!("{ADMIN_TOKEN_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    (
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "status": "ok" })),
    )
        .into_response()
}

/// Report whether the caller holds a valid token. Never rejects.
#[instrument(skip_all)]
pub async fn status(State(state): State<AppState>, headers: HeaderMap) -> Json<serde_json::Value> {
    let authenticated = token_from_cookies(&headers)
        .and_then(|token| state.auth().verify_token(&token).ok())
        .is_some();
    Json(json!({ "authenticated": authenticated }))
}
