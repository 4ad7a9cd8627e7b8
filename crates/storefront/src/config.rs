//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://localhost:3000`)
//! - `NONNA_DATA_DIR` - Document store directory (default: `data`)
//! - `CHECKOUT_SUBMIT_TIMEOUT_SECS` - Hard cap on a payment submission
//!   before it fails back to the payment step (default: 10)
//! - `CHECKOUT_GATEWAY_DELAY_MS` - Simulated gateway processing time
//!   (default: 2000)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory holding the document store's collection files
    pub data_dir: PathBuf,
    /// Hard timeout on a checkout submission
    pub submit_timeout: Duration,
    /// Simulated payment gateway processing delay
    pub gateway_delay: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let data_dir = PathBuf::from(get_env_or_default("NONNA_DATA_DIR", "data"));

        let submit_timeout = Duration::from_secs(parse_env_or_default(
            "CHECKOUT_SUBMIT_TIMEOUT_SECS",
            10,
        )?);
        let gateway_delay =
            Duration::from_millis(parse_env_or_default("CHECKOUT_GATEWAY_DELAY_MS", 2000)?);

        Ok(Self {
            host,
            port,
            base_url,
            data_dir,
            submit_timeout,
            gateway_delay,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable as a number, falling back to a default.
fn parse_env_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            data_dir: PathBuf::from("data"),
            submit_timeout: Duration::from_secs(10),
            gateway_delay: Duration::from_millis(2000),
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_defaults_parse() {
        // No storefront variables set in the test environment.
        let config = StorefrontConfig::from_env().unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.gateway_delay, Duration::from_millis(2000));
    }
}
