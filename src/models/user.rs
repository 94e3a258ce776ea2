//! User model
//!
//! Defines the User entity and the role/status enums used for
//! authorization decisions across the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing a registered account.
///
/// Roles determine which parts of the API an account may mutate; the
/// password hash never leaves the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub role: UserRole,
    /// Account status
    pub status: UserStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User. The password must already be hashed; use
    /// `services::password::hash_password()`.
    pub fn new(username: String, email: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            password_hash,
            role,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Check if the user is a manager (or higher)
    pub fn is_manager(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Manager)
    }

    /// Check if the account is suspended
    pub fn is_suspended(&self) -> bool {
        self.status == UserStatus::Suspended
    }
}

/// User role for authorization.
///
/// - Admin: full access, manages users and the category taxonomy
/// - Manager: may additionally mutate campaigns and revenue records
/// - Member: authenticated read/write on own resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator - full access
    Admin,
    /// Manager - campaign and revenue management
    Manager,
    /// Member - default role
    #[default]
    Member,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Manager => write!(f, "manager"),
            UserRole::Member => write!(f, "member"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "manager" => Ok(UserRole::Manager),
            "member" => Ok(UserRole::Member),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Active - normal access
    #[default]
    Active,
    /// Suspended - cannot login
    Suspended,
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Suspended => write!(f, "suspended"),
        }
    }
}

impl FromStr for UserStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "suspended" => Ok(UserStatus::Suspended),
            _ => Err(anyhow::anyhow!("Invalid user status: {}", s)),
        }
    }
}

/// Input for updating a user
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    /// New password (optional, will be hashed)
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: UserRole) -> User {
        User::new(
            "someone".to_string(),
            "someone@example.com".to_string(),
            "hash".to_string(),
            role,
        )
    }

    #[test]
    fn test_user_new_defaults() {
        let user = user_with_role(UserRole::Member);

        assert_eq!(user.id, 0);
        assert_eq!(user.status, UserStatus::Active);
        assert!(!user.is_suspended());
    }

    #[test]
    fn test_role_hierarchy() {
        assert!(user_with_role(UserRole::Admin).is_admin());
        assert!(user_with_role(UserRole::Admin).is_manager());
        assert!(user_with_role(UserRole::Manager).is_manager());
        assert!(!user_with_role(UserRole::Manager).is_admin());
        assert!(!user_with_role(UserRole::Member).is_manager());
    }

    #[test]
    fn test_role_display_and_from_str() {
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert_eq!(UserRole::Manager.to_string(), "manager");
        assert_eq!(UserRole::Member.to_string(), "member");

        assert_eq!(UserRole::from_str("ADMIN").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("Manager").unwrap(), UserRole::Manager);
        assert!(UserRole::from_str("superuser").is_err());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(UserStatus::from_str("active").unwrap(), UserStatus::Active);
        assert_eq!(
            UserStatus::from_str("suspended").unwrap(),
            UserStatus::Suspended
        );
        assert!(UserStatus::from_str("banned").is_err());
    }
}
