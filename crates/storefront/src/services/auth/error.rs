//! Authentication error types.

use ecommers_core::FieldErrors;
use ecommers_core::UserId;
use ecommers_core::session::TokenError;
use ecommers_core::store::{CredentialError, StoreError};
use thiserror::Error;

/// Errors that can occur during login and registration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed login input, unknown email, or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration input failed validation.
    #[error("invalid registration: {0}")]
    Validation(FieldErrors),

    /// An identity with this email already exists.
    #[error("email already registered")]
    EmailTaken,

    /// Credentials verified but no profile exists for the identity.
    #[error("no profile for verified identity {0}")]
    ProfileMissing(UserId),

    /// The credential service failed.
    #[error("credential service error: {0}")]
    Credential(#[source] CredentialError),

    /// The profile store failed.
    #[error("profile store error: {0}")]
    Store(#[from] StoreError),

    /// The profile write failed after the identity was created, and the
    /// identity could not be deleted either.
    #[error("identity {user_id} has no profile and could not be removed: {source}")]
    OrphanedIdentity {
        user_id: UserId,
        #[source]
        source: StoreError,
    },

    /// Session token could not be minted.
    #[error("session token error: {0}")]
    Token(#[from] TokenError),
}

impl AuthError {
    /// Whether this failure should reach error tracking.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        !matches!(
            self,
            Self::InvalidCredentials | Self::Validation(_) | Self::EmailTaken
        )
    }
}
