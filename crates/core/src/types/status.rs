//! Status and role enums.
//!
//! Both are persisted as TEXT using their `Display` form and read back
//! through `FromStr`.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Orders are created `Pending`. Administrators may move an order to any
/// status; there is no enforced transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// The persisted and displayed name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Authorization role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Shopper: storefront only.
    #[default]
    User,
    /// Back-office access.
    Admin,
}

impl Role {
    /// The address that is granted `Admin` at registration.
    pub const DESIGNATED_ADMIN_EMAIL: &'static str = "admin@admin.com";

    /// Role assigned to a newly registered account.
    #[must_use]
    pub fn for_new_account(email: &crate::Email) -> Self {
        if email.eq_ignore_case(Self::DESIGNATED_ADMIN_EMAIL) {
            Self::Admin
        } else {
            Self::User
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "USER"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Email;

    #[test]
    fn test_order_status_round_trips_through_text() {
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("Lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_serde_uses_display_names() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"Shipped\"");
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"USER\"").unwrap(),
            Role::User
        );
    }

    #[test]
    fn test_designated_admin_is_case_insensitive() {
        let upper = Email::parse("ADMIN@Admin.com").unwrap();
        assert_eq!(Role::for_new_account(&upper), Role::Admin);

        let shopper = Email::parse("shopper@admin.com").unwrap();
        assert_eq!(Role::for_new_account(&shopper), Role::User);
    }
}
