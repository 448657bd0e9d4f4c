//! User profile.

use serde::{Deserialize, Serialize};

use crate::{Email, Role, UserId};

/// A user profile.
///
/// The profile shares its ID with the credential identity it was created
/// for. The same shape is embedded in session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

impl User {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
