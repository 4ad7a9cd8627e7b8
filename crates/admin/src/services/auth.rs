//! Admin authentication: credential check and cookie-token lifecycle.
//!
//! There is exactly one back-office operator account, configured through
//! the environment. A successful login mints a short-lived HS256 JWT that
//! travels in an `HttpOnly` cookie; every protected route verifies it.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AdminConfig;

/// Cookie carrying the admin token.
pub const ADMIN_TOKEN_COOKIE: &str = "admin_token";

/// Token lifetime in seconds (1 day).
pub const TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Authentication failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token missing, malformed, expired, or signed with another key.
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Token parsed but does not carry the admin role.
    #[error("token lacks the admin role")]
    MissingRole,

    /// Token could not be created.
    #[error("failed to issue token: {0}")]
    TokenCreation(jsonwebtoken::errors::Error),
}

/// Claims carried by the admin token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Subject: the operator username.
    pub sub: String,
    /// Always `"admin"`.
    pub role: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Credential verification and token mint/verify.
pub struct AuthService {
    username: String,
    password: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    #[must_use]
    pub fn new(config: &AdminConfig) -> Self {
        let secret = config.token_secret.expose_secret().as_bytes();
        Self {
            username: config.username.clone(),
            password: config.password.expose_secret().to_owned(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Check the login credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on any mismatch; the error
    /// never says which half was wrong.
    pub fn verify_credentials(&self, username: &str, password: &str) -> Result<(), AuthError> {
        // Compare both fields regardless, to keep timing uniform.
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        if user_ok && pass_ok {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Mint a fresh admin token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenCreation`] when encoding fails.
    pub fn issue_token(&self) -> Result<String, AuthError> {
        let claims = AdminClaims {
            sub: self.username.clone(),
            role: "admin".to_owned(),
            exp: Utc::now().timestamp() + TOKEN_TTL_SECONDS,
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::TokenCreation)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the token is invalid, expired, or does
    /// not carry the admin role.
    pub fn verify_token(&self, token: &str) -> Result<AdminClaims, AuthError> {
        let data = decode::<AdminClaims>(token, &self.decoding_key, &Validation::default())?;
        if data.claims.role != "admin" {
            return Err(AuthError::MissingRole);
        }
        Ok(data.claims)
    }
}

/// Constant-time byte comparison. Length leaks, contents do not.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
