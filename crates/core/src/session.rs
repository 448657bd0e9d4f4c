//! Signed session tokens and the session cookie.
//!
//! A session token is a compact HS256 JWT carrying the user's profile
//! (`id`, `name`, `email`, `role`) plus `iat`/`exp`. Tokens are valid for
//! [`SESSION_TTL_SECONDS`]. Resolving a token never consults a store: the
//! signature and expiry are the whole check.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{Email, Role, User, UserId};

type HmacSha256 = Hmac<Sha256>;

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE_NAME: &str = "e-commers-v-session";

/// Session lifetime: 7 days.
pub const SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

const ALGORITHM: &str = "HS256";

/// Errors from minting or verifying a session token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token signature does not match")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("invalid signing key")]
    InvalidKey,

    #[error("failed to encode token: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl SessionClaims {
    #[must_use]
    pub fn user(&self) -> User {
        User {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// A freshly minted token and its expiry.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints and verifies session tokens with a server-held secret.
#[derive(Clone)]
pub struct SessionSigner {
    secret: SecretString,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

impl SessionSigner {
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| TokenError::InvalidKey)
    }

    /// Mint a token for `user`, issued at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be encoded.
    pub fn mint(&self, user: &User, now: DateTime<Utc>) -> Result<SessionToken, TokenError> {
        let expires_at = now + TimeDelta::seconds(SESSION_TTL_SECONDS);
        let claims = SessionClaims {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let header = Header {
            alg: ALGORITHM.to_owned(),
            typ: "JWT".to_owned(),
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(SessionToken {
            value: format!("{signing_input}.{signature}"),
            expires_at,
        })
    }

    /// Verify `token` and return its claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed, signed with another key or
    /// algorithm, or expired at `now`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header: Header = decode_segment(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: SessionClaims = decode_segment(claims_b64)?;
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Resolve the user behind an optional token at `now`.
    ///
    /// Every verification failure resolves to `None`.
    #[must_use]
    pub fn resolve_at(&self, token: Option<&str>, now: DateTime<Utc>) -> Option<User> {
        let token = token.filter(|t| !t.is_empty())?;
        match self.verify(token, now) {
            Ok(claims) => Some(claims.user()),
            Err(e) => {
                tracing::debug!(error = %e, "Discarding invalid session token");
                None
            }
        }
    }

    /// Resolve the user behind an optional token right now.
    #[must_use]
    pub fn resolve(&self, token: Option<&str>) -> Option<User> {
        self.resolve_at(token, Utc::now())
    }

    /// Resolve the user from a request's `Cookie` header values.
    ///
    /// The first header carrying a session cookie wins.
    #[must_use]
    pub fn resolve_cookie_headers<'h>(
        &self,
        headers: impl IntoIterator<Item = &'h str>,
    ) -> Option<User> {
        let token = headers.into_iter().find_map(token_from_cookie_header);
        self.resolve(token)
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

/// Builds `Set-Cookie` values for the session cookie.
#[derive(Debug, Clone, Default)]
pub struct SessionCookie {
    /// Add the `Secure` attribute (HTTPS deployments).
    pub secure: bool,
    /// Optional `Domain` so storefront and admin share the cookie.
    pub domain: Option<String>,
}

impl SessionCookie {
    #[must_use]
    pub const fn new(secure: bool, domain: Option<String>) -> Self {
        Self { secure, domain }
    }

    fn attributes(&self) -> String {
        let mut attrs = String::from("; Path=/; HttpOnly; SameSite=Lax");
        if self.secure {
            attrs.push_str("; Secure");
        }
        if let Some(domain) = &self.domain {
            attrs.push_str("; Domain=");
            attrs.push_str(domain);
        }
        attrs
    }

    /// `Set-Cookie` value that stores `token`.
    #[must_use]
    pub fn issue(&self, token: &SessionToken) -> String {
        format!(
            "{SESSION_COOKIE_NAME}={}; Max-Age={SESSION_TTL_SECONDS}; Expires={}{}",
            token.value,
            token.expires_at.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.attributes()
        )
    }

    /// `Set-Cookie` value that removes the session cookie.
    #[must_use]
    pub fn clear(&self) -> String {
        format!(
            "{SESSION_COOKIE_NAME}=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT{}",
            self.attributes()
        )
    }
}

/// Extract the session token from a `Cookie` request header value.
#[must_use]
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
