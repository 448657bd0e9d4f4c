//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `SESSION_SECRET` - Session token signing secret (min 32 chars, high entropy),
//!   shared with the admin binary
//! - `ADMIN_BASE_URL` - Public URL of the admin back-office (admin logins land there)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SESSION_COOKIE_DOMAIN` - Cookie domain shared with the admin binary
//! - `UPLOADS_DIR` - Directory of uploaded product images served at `/uploads` (default: uploads)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `LOG_FORMAT` - `text` (default) or `json`

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use ecommers_core::config::{
    ConfigError, LogFormat, database_url, env_or_default, is_https, optional_env, parse_env,
    required_env, session_secret,
};
use ecommers_core::session::SessionCookie;
use secrecy::SecretString;

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Public base URL for the admin back-office
    pub admin_base_url: String,
    /// Session token signing secret
    pub session_secret: SecretString,
    /// Domain attribute for the session cookie
    pub cookie_domain: Option<String>,
    /// Directory holding uploaded product images
    pub uploads_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Log output format
    pub log_format: LogFormat,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the session secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: database_url("STOREFRONT_DATABASE_URL")?,
            host: parse_env("STOREFRONT_HOST", "127.0.0.1")?,
            port: parse_env("STOREFRONT_PORT", "3000")?,
            base_url: trimmed_url(required_env("STOREFRONT_BASE_URL")?),
            admin_base_url: trimmed_url(required_env("ADMIN_BASE_URL")?),
            session_secret: session_secret("SESSION_SECRET")?,
            cookie_domain: optional_env("SESSION_COOKIE_DOMAIN"),
            uploads_dir: PathBuf::from(env_or_default("UPLOADS_DIR", "uploads")),
            sentry_dsn: optional_env("SENTRY_DSN"),
            sentry_environment: optional_env("SENTRY_ENVIRONMENT"),
            log_format: parse_env("LOG_FORMAT", "text")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        is_https(&self.base_url)
    }

    /// Builder for the session cookie.
    #[must_use]
    pub fn session_cookie(&self) -> SessionCookie {
        SessionCookie::new(self.is_secure(), self.cookie_domain.clone())
    }

    /// Where administrators land after logging in.
    #[must_use]
    pub fn admin_dashboard_url(&self) -> String {
        format!("{}/dashboard", self.admin_base_url)
    }
}

fn trimmed_url(url: String) -> String {
    url.trim_end_matches('/').to_owned()
}

#[cfg(test)]
pub(crate) fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/ecommers_test"),
        host: IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: "http://localhost:3000".to_owned(),
        admin_base_url: "http://localhost:3001".to_owned(),
        session_secret: SecretString::from("k9Vq2mXw7LzR4tYb8NcH3jPf6GsD1aEu"),
        cookie_domain: None,
        uploads_dir: PathBuf::from("uploads"),
        sentry_dsn: None,
        sentry_environment: None,
        log_format: LogFormat::Text,
    }
}
