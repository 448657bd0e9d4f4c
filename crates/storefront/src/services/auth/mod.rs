//! Login and registration.
//!
//! Passwords are only ever handed to the [`CredentialVerifier`]; this
//! service never hashes or compares them. A successful login or
//! registration yields a signed session token carrying the user's profile.

mod error;

pub use error::AuthError;

use chrono::Utc;
use ecommers_core::session::{SessionSigner, SessionToken};
use ecommers_core::store::{CredentialError, CredentialVerifier, StoreError, UserStore};
use ecommers_core::{Email, FieldErrors, Role, User, UserId};
use tracing::instrument;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A signed-in user and their fresh session token.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: User,
    pub token: SessionToken,
}

/// Identity confirmed by the credential service, before its profile is loaded.
#[derive(Debug)]
struct VerifiedIdentity {
    id: UserId,
}

/// Authentication service.
pub struct AuthService<'a, C, U> {
    credentials: &'a C,
    users: &'a U,
    signer: &'a SessionSigner,
}

impl<'a, C, U> AuthService<'a, C, U>
where
    C: CredentialVerifier,
    U: UserStore,
{
    #[must_use]
    pub const fn new(credentials: &'a C, users: &'a U, signer: &'a SessionSigner) -> Self {
        Self {
            credentials,
            users,
            signer,
        }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for malformed input, unknown
    /// emails and wrong passwords alike. Returns `AuthError::ProfileMissing`
    /// if the identity has no profile, and dependency errors otherwise.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        // Shape check first: neither field is reported individually.
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::InvalidCredentials);
        };
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let identity = self.verify(&email, password).await?;
        let user = self.load_profile(&identity).await?;
        let token = self.signer.mint(&user, Utc::now())?;

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(SignedIn { user, token })
    }

    /// Register a new account and sign it in.
    ///
    /// The designated admin address becomes `ADMIN`; everyone else is `USER`.
    /// If the profile cannot be written, the just-created identity is
    /// deleted again.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for bad input, `AuthError::EmailTaken`
    /// for a duplicate email, and dependency errors otherwise.
    #[instrument(skip(self, name, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SignedIn, AuthError> {
        let (name, email) = validate_registration(name, email, password)?;
        let role = Role::for_new_account(&email);

        let id = self
            .credentials
            .create_identity(&email, password, &name)
            .await
            .map_err(|e| match e {
                CredentialError::AlreadyExists => AuthError::EmailTaken,
                other => AuthError::Credential(other),
            })?;

        let user = User {
            id,
            name,
            email,
            role,
        };

        if let Err(e) = self.users.create(&user).await {
            return Err(self.roll_back_identity(&user.id, e).await);
        }

        let token = self.signer.mint(&user, Utc::now())?;
        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(SignedIn { user, token })
    }

    async fn verify(&self, email: &Email, password: &str) -> Result<VerifiedIdentity, AuthError> {
        match self.credentials.verify(email, password).await {
            Ok(id) => Ok(VerifiedIdentity { id }),
            Err(CredentialError::Rejected) => Err(AuthError::InvalidCredentials),
            Err(e) => {
                tracing::warn!(error = %e, "Credential verification failed");
                Err(AuthError::Credential(e))
            }
        }
    }

    async fn load_profile(&self, identity: &VerifiedIdentity) -> Result<User, AuthError> {
        match self.users.get(&identity.id).await? {
            Some(user) => Ok(user),
            None => {
                tracing::error!(user_id = %identity.id, "Verified identity has no profile");
                Err(AuthError::ProfileMissing(identity.id.clone()))
            }
        }
    }

    /// Delete an identity whose profile write failed and return the error
    /// to report.
    async fn roll_back_identity(&self, id: &UserId, cause: StoreError) -> AuthError {
        match self.credentials.delete_identity(id).await {
            Ok(()) => {
                tracing::warn!(user_id = %id, error = %cause, "Profile write failed; identity removed");
                AuthError::Store(cause)
            }
            Err(delete_error) => {
                tracing::error!(
                    user_id = %id,
                    error = %cause,
                    delete_error = %delete_error,
                    "Profile write failed and identity could not be removed; manual cleanup required"
                );
                AuthError::OrphanedIdentity {
                    user_id: id.clone(),
                    source: cause,
                }
            }
        }
    }
}

/// Validate registration input, returning the trimmed name and parsed email.
///
/// # Errors
///
/// Returns `AuthError::Validation` listing every failing field.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
) -> Result<(String, Email), AuthError> {
    let mut errors = FieldErrors::new();

    let name = name.trim();
    if name.is_empty() {
        errors.add("name", "Name is required.");
    }

    let email = Email::parse(email).ok();
    if email.is_none() {
        errors.add("email", "Please enter a valid email address.");
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters."),
        );
    }

    match email {
        Some(email) if errors.is_empty() => Ok((name.to_owned(), email)),
        _ => Err(AuthError::Validation(errors)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ecommers_core::store::memory::{MemoryCredentials, MemoryUserStore};
    use secrecy::SecretString;

    use super::*;

    struct Fixture {
        credentials: MemoryCredentials,
        users: MemoryUserStore,
        signer: SessionSigner,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                credentials: MemoryCredentials::new(),
                users: MemoryUserStore::new(),
                signer: SessionSigner::new(SecretString::from("k9Vq2mXw7LzR4tYb8NcH3jPf6GsD1aEu")),
            }
        }

        fn service(&self) -> AuthService<'_, MemoryCredentials, MemoryUserStore> {
            AuthService::new(&self.credentials, &self.users, &self.signer)
        }

        async fn seed_user(&self, email: &str, password: &str, role: Role) -> User {
            let email = Email::parse(email).unwrap();
            let id = self.credentials.insert(&email, password);
            let user = User {
                id,
                name: "Ada".into(),
                email,
                role,
            };
            self.users.create(&user).await.unwrap();
            user
        }
    }

    #[tokio::test]
    async fn test_login_returns_profile_and_token() {
        let fx = Fixture::new();
        let user = fx.seed_user("ada@example.com", "correct-horse", Role::User).await;

        let signed_in = fx.service().login("ada@example.com", "correct-horse").await.unwrap();

        assert_eq!(signed_in.user, user);
        assert_eq!(fx.signer.resolve(Some(&signed_in.token.value)), Some(user));
    }

    #[tokio::test]
    async fn test_login_preserves_admin_role() {
        let fx = Fixture::new();
        fx.seed_user("admin@admin.com", "correct-horse", Role::Admin).await;

        let signed_in = fx.service().login("admin@admin.com", "correct-horse").await.unwrap();
        assert_eq!(signed_in.user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let fx = Fixture::new();
        fx.seed_user("ada@example.com", "correct-horse", Role::User).await;
        let service = fx.service();

        for (email, password) in [
            ("ada@example.com", "wrong-password"),
            ("nobody@example.com", "correct-horse"),
            ("not-an-email", "correct-horse"),
            ("ada@example.com", ""),
        ] {
            let err = service.login(email, password).await.unwrap_err();
            assert!(
                matches!(err, AuthError::InvalidCredentials),
                "{email}/{password} gave {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_input_never_reaches_credential_service() {
        let fx = Fixture::new();
        fx.credentials.go_offline();

        let err = fx.service().login("bad", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = fx.service().login("ada@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Credential(_)));
    }

    #[tokio::test]
    async fn test_login_without_profile_fails() {
        let fx = Fixture::new();
        fx.credentials
            .insert(&Email::parse("ghost@example.com").unwrap(), "correct-horse");

        let err = fx.service().login("ghost@example.com", "correct-horse").await.unwrap_err();
        assert!(matches!(err, AuthError::ProfileMissing(_)));
    }

    #[tokio::test]
    async fn test_register_assigns_roles() {
        let fx = Fixture::new();
        let service = fx.service();

        let admin = service.register("Root", "Admin@Admin.com", "correct-horse").await.unwrap();
        assert_eq!(admin.user.role, Role::Admin);
        assert!(fx.users.has_admin_marker(&admin.user.id));

        let shopper = service.register(" Ada ", "ada@example.com", "correct-horse").await.unwrap();
        assert_eq!(shopper.user.role, Role::User);
        assert_eq!(shopper.user.name, "Ada");
        assert!(!fx.users.has_admin_marker(&shopper.user.id));

        let stored = fx.users.get(&shopper.user.id).await.unwrap();
        assert_eq!(stored, Some(shopper.user));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let fx = Fixture::new();
        let registered = fx
            .service()
            .register("Ada", "ada@example.com", "correct-horse")
            .await
            .unwrap();
        let logged_in = fx.service().login("ada@example.com", "correct-horse").await.unwrap();
        assert_eq!(registered.user, logged_in.user);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let fx = Fixture::new();
        fx.service().register("Ada", "ada@example.com", "correct-horse").await.unwrap();

        let err = fx
            .service()
            .register("Ada Again", "ADA@example.com", "another-pass")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(fx.users.len(), 1);
    }

    #[tokio::test]
    async fn test_register_validation_reports_each_field() {
        let fx = Fixture::new();
        let err = fx.service().register("  ", "nope", "short").await.unwrap_err();

        let AuthError::Validation(fields) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(fields.get("name"), Some("Name is required."));
        assert_eq!(fields.get("email"), Some("Please enter a valid email address."));
        assert_eq!(fields.get("password"), Some("Password must be at least 8 characters."));
        assert!(fx.users.is_empty());
    }

    #[tokio::test]
    async fn test_profile_write_failure_rolls_back_identity() {
        let fx = Fixture::new();
        fx.users.fail_writes();

        let err = fx
            .service()
            .register("Ada", "ada@example.com", "correct-horse")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));

        let email = Email::parse("ada@example.com").unwrap();
        assert_eq!(fx.credentials.find_identity(&email).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_rollback_reports_orphan() {
        let fx = Fixture::new();
        fx.users.fail_writes();
        fx.credentials.fail_deletes();

        let err = fx
            .service()
            .register("Ada", "ada@example.com", "correct-horse")
            .await
            .unwrap_err();

        let AuthError::OrphanedIdentity { user_id, .. } = err else {
            panic!("expected orphaned identity, got {err:?}");
        };
        assert!(fx.credentials.contains(&user_id));
    }
}
