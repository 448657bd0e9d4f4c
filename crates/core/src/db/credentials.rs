//! Argon2 credential store.
//!
//! This is the only code that reads or writes password hashes.

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use crate::store::{CredentialError, CredentialVerifier, StoreError};
use crate::{Email, UserId};

/// Postgres [`CredentialVerifier`] storing Argon2id hashes.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for CredentialError {
    fn from(e: sqlx::Error) -> Self {
        match StoreError::from(e) {
            StoreError::Conflict(_) => Self::AlreadyExists,
            other => Self::Unavailable(other.to_string()),
        }
    }
}

impl CredentialVerifier for PgCredentialStore {
    async fn verify(&self, email: &Email, password: &str) -> Result<UserId, CredentialError> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT id, password_hash FROM credentials WHERE lower(email) = lower($1)",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((id, hash)) => {
                verify_password(password, &hash)?;
                Ok(UserId::new(id))
            }
            None => {
                // Spend the same hashing work as a real check.
                if let Some(dummy) = dummy_hash() {
                    let _ = verify_password(password, dummy);
                }
                Err(CredentialError::Rejected)
            }
        }
    }

    async fn create_identity(
        &self,
        email: &Email,
        password: &str,
        display_name: &str,
    ) -> Result<UserId, CredentialError> {
        let id = UserId::generate();
        let hash = hash_password(password)?;

        sqlx::query(
            "INSERT INTO credentials (id, email, display_name, password_hash) VALUES ($1, $2, $3, $4)",
        )
        .bind(id.as_str())
        .bind(email.as_str())
        .bind(display_name)
        .bind(hash)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn delete_identity(&self, id: &UserId) -> Result<(), CredentialError> {
        sqlx::query("DELETE FROM credentials WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_identity(&self, email: &Email) -> Result<Option<UserId>, CredentialError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT id FROM credentials WHERE lower(email) = lower($1)")
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id,)| UserId::new(id)))
    }
}

fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Unavailable(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> Result<(), CredentialError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| CredentialError::Rejected)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| CredentialError::Rejected)
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("timing-equalizer").ok())
        .as_deref()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(CredentialError::Rejected)
        ));
    }

    #[test]
    fn test_unparseable_hash_is_rejected() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(CredentialError::Rejected)
        ));
    }
}
