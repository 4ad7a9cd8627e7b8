//! Authentication extractor for protected admin routes.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::COOKIE, request::Parts},
};

use crate::error::ApiError;
use crate::services::auth::{ADMIN_TOKEN_COOKIE, AdminClaims};
use crate::state::AppState;

/// Extractor that requires a valid admin token cookie.
///
/// Rejects with 401 Unauthorized (a JSON error body) when the cookie is
/// missing or the token does not verify.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(claims): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", claims.sub)
/// }
/// ```
pub struct RequireAdminAuth(pub AdminClaims);

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_cookies(&parts.headers).ok_or(ApiError::Unauthorized)?;
        let claims = state.auth().verify_token(&token).map_err(|err| {
            tracing::debug!(error = %err, "admin token rejected");
            ApiError::Unauthorized
        })?;
        Ok(Self(claims))
    }
}

/// Pull the admin token out of the `Cookie` header, if present.
pub fn token_from_cookies(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == ADMIN_TOKEN_COOKIE).then(|| value.to_owned())
    })
}
