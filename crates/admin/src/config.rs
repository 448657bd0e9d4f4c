//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_BASE_URL` - Public URL for the admin back-office
//! - `STOREFRONT_BASE_URL` - Public URL of the storefront (login lives there)
//! - `SESSION_SECRET` - Session token signing secret, the same value the
//!   storefront uses (min 32 chars, high entropy)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `SESSION_COOKIE_DOMAIN` - Cookie domain shared with the storefront
//! - `UPLOADS_DIR` - Directory product images are written to (default: uploads)
//! - `UPLOADS_PUBLIC_URL` - Public prefix for uploaded images
//!   (default: `{STOREFRONT_BASE_URL}/uploads`)
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

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin back-office
    pub base_url: String,
    /// Public base URL for the storefront
    pub storefront_base_url: String,
    /// Session token signing secret
    pub session_secret: SecretString,
    /// Domain attribute for the session cookie
    pub cookie_domain: Option<String>,
    /// Directory uploaded product images are written to
    pub uploads_dir: PathBuf,
    /// Public URL prefix for uploaded images
    pub uploads_public_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Log output format
    pub log_format: LogFormat,
}

impl AdminConfig {
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

        let storefront_base_url = trimmed_url(required_env("STOREFRONT_BASE_URL")?);
        let uploads_public_url = optional_env("UPLOADS_PUBLIC_URL")
            .map_or_else(|| format!("{storefront_base_url}/uploads"), trimmed_url);

        Ok(Self {
            database_url: database_url("ADMIN_DATABASE_URL")?,
            host: parse_env("ADMIN_HOST", "127.0.0.1")?,
            port: parse_env("ADMIN_PORT", "3001")?,
            base_url: trimmed_url(required_env("ADMIN_BASE_URL")?),
            storefront_base_url,
            session_secret: session_secret("SESSION_SECRET")?,
            cookie_domain: optional_env("SESSION_COOKIE_DOMAIN"),
            uploads_dir: PathBuf::from(env_or_default("UPLOADS_DIR", "uploads")),
            uploads_public_url,
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

    /// Builder for the session cookie.
    #[must_use]
    pub fn session_cookie(&self) -> SessionCookie {
        SessionCookie::new(is_https(&self.base_url), self.cookie_domain.clone())
    }

    /// Storefront login page; the admin gate sends visitors here.
    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}/login", self.storefront_base_url)
    }
}

fn trimmed_url(url: String) -> String {
    url.trim_end_matches('/').to_owned()
}

#[cfg(test)]
pub(crate) fn test_config() -> AdminConfig {
    AdminConfig {
        database_url: SecretString::from("postgres://localhost/ecommers_test"),
        host: IpAddr::from([127, 0, 0, 1]),
        port: 3001,
        base_url: "http://localhost:3001".to_owned(),
        storefront_base_url: "http://localhost:3000".to_owned(),
        session_secret: SecretString::from("k9Vq2mXw7LzR4tYb8NcH3jPf6GsD1aEu"),
        cookie_domain: None,
        uploads_dir: std::env::temp_dir().join("ecommers-admin-test-uploads"),
        uploads_public_url: "http://localhost:3000/uploads".to_owned(),
        sentry_dsn: None,
        sentry_environment: None,
        log_format: LogFormat::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_points_at_storefront() {
        assert_eq!(test_config().login_url(), "http://localhost:3000/login");
    }

    #[test]
    fn test_cookie_matches_admin_scheme() {
        let mut config = test_config();
        config.cookie_domain = Some("shop.test".to_owned());
        config.base_url = "https://admin.shop.test".to_owned();

        let cookie = config.session_cookie();
        assert!(cookie.secure);
        assert_eq!(cookie.domain.as_deref(), Some("shop.test"));
    }
}
