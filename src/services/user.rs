//! User service
//!
//! Implements business logic for accounts and authentication:
//! - Registration (the first user becomes admin)
//! - Login with credential verification and bearer token issuance
//! - Password changes
//! - Admin-side user management

use crate::config::JwtConfig;
use crate::db::repositories::UserRepository;
use crate::models::{ListParams, UpdateUserInput, User, UserRole};
use crate::services::password::{hash_password, verify_password};
use crate::services::token;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials or suspended account)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// User not found
    #[error("User not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterInput {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Input for login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username_or_email: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(username_or_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username_or_email: username_or_email.into(),
            password: password.into(),
        }
    }
}

/// User service for accounts and authentication
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    jwt: JwtConfig,
}

impl UserService {
    /// Create a new user service
    pub fn new(repo: Arc<dyn UserRepository>, jwt: JwtConfig) -> Self {
        Self { repo, jwt }
    }

    /// Register a new user.
    ///
    /// The first user in the system is assigned the Admin role; everyone
    /// after that starts as Member.
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        self.validate_register_input(&input)?;

        if self
            .repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        if self
            .repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let is_first = self.repo.count().await.context("Failed to count users")? == 0;
        let role = if is_first {
            UserRole::Admin
        } else {
            UserRole::Member
        };

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let user = User::new(input.username, input.email, password_hash, role);

        let created = self
            .repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        Ok(created)
    }

    /// Login with credentials, returning the user and a signed bearer
    /// token on success.
    pub async fn login(&self, input: LoginInput) -> Result<(User, String), UserServiceError> {
        let user = self
            .find_by_username_or_email(&input.username_or_email)
            .await?
            .ok_or_else(|| {
                UserServiceError::AuthenticationError("Invalid username or password".to_string())
            })?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;

        if !password_valid {
            return Err(UserServiceError::AuthenticationError(
                "Invalid username or password".to_string(),
            ));
        }

        if user.is_suspended() {
            return Err(UserServiceError::AuthenticationError(
                "Account is suspended".to_string(),
            ));
        }

        let token = token::issue_token(&self.jwt, &user)
            .map_err(|e| UserServiceError::InternalError(anyhow::anyhow!(e)))?;

        Ok((user, token))
    }

    /// Get a user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get user")
            .map_err(Into::into)
    }

    /// Change a user's password, verifying the current one first
    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), UserServiceError> {
        if new_password.len() < 8 {
            return Err(UserServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let mut user = self
            .repo
            .get_by_id(user_id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound)?;

        let valid = verify_password(current_password, &user.password_hash)
            .context("Failed to verify password")?;
        if !valid {
            return Err(UserServiceError::ValidationError(
                "Current password is incorrect".to_string(),
            ));
        }

        user.password_hash = hash_password(new_password).context("Failed to hash password")?;
        self.repo
            .update(&user)
            .await
            .context("Failed to update user")?;

        Ok(())
    }

    /// List users with pagination (admin)
    pub async fn list(&self, params: &ListParams) -> Result<(Vec<User>, i64), UserServiceError> {
        self.repo
            .list(params)
            .await
            .context("Failed to list users")
            .map_err(Into::into)
    }

    /// Apply an admin update (role, status, email, password reset)
    pub async fn admin_update(
        &self,
        user_id: i64,
        input: UpdateUserInput,
    ) -> Result<User, UserServiceError> {
        let mut user = self
            .repo
            .get_by_id(user_id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound)?;

        if let Some(username) = input.username {
            let trimmed = username.trim();
            if trimmed.is_empty() {
                return Err(UserServiceError::ValidationError(
                    "Username cannot be empty".to_string(),
                ));
            }
            user.username = trimmed.to_string();
        }
        if let Some(email) = input.email {
            if !email.contains('@') {
                return Err(UserServiceError::ValidationError(
                    "Invalid email format".to_string(),
                ));
            }
            user.email = email;
        }
        if let Some(password) = input.password {
            user.password_hash = hash_password(&password).context("Failed to hash password")?;
        }
        if let Some(role) = input.role {
            user.role = role;
        }
        if let Some(status) = input.status {
            user.status = status;
        }

        self.repo
            .update(&user)
            .await
            .context("Failed to update user")
            .map_err(Into::into)
    }

    /// Delete a user (admin). The last admin cannot be removed.
    pub async fn admin_delete(&self, user_id: i64) -> Result<(), UserServiceError> {
        let user = self
            .repo
            .get_by_id(user_id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound)?;

        if user.is_admin() {
            let admins = self
                .repo
                .count_admins()
                .await
                .context("Failed to count admins")?;
            if admins <= 1 {
                return Err(UserServiceError::ValidationError(
                    "Cannot delete the last admin".to_string(),
                ));
            }
        }

        self.repo
            .delete(user_id)
            .await
            .context("Failed to delete user")
            .map_err(Into::into)
    }

    fn validate_register_input(&self, input: &RegisterInput) -> Result<(), UserServiceError> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if username.len() > 50 {
            return Err(UserServiceError::ValidationError(
                "Username is too long".to_string(),
            ));
        }
        if !input.email.contains('@') {
            return Err(UserServiceError::ValidationError(
                "Invalid email format".to_string(),
            ));
        }
        if input.password.len() < 8 {
            return Err(UserServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        Ok(())
    }

    async fn find_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, UserServiceError> {
        if username_or_email.contains('@') {
            self.repo
                .get_by_email(username_or_email)
                .await
                .context("Failed to find user by email")
                .map_err(Into::into)
        } else {
            self.repo
                .get_by_username(username_or_email)
                .await
                .context("Failed to find user by username")
                .map_err(Into::into)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxUserRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::UserStatus;
    use crate::services::token::verify_token;

    async fn setup() -> UserService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        UserService::new(SqlxUserRepository::shared(pool), JwtConfig::default())
    }

    fn register_input(name: &str) -> RegisterInput {
        RegisterInput::new(name, format!("{}@example.com", name), "password123")
    }

    #[tokio::test]
    async fn test_first_user_becomes_admin() {
        let service = setup().await;

        let first = service.register(register_input("first")).await.unwrap();
        assert_eq!(first.role, UserRole::Admin);

        let second = service.register(register_input("second")).await.unwrap();
        assert_eq!(second.role, UserRole::Member);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let service = setup().await;

        service.register(register_input("dup")).await.unwrap();
        let result = service
            .register(RegisterInput::new("dup", "other@example.com", "password123"))
            .await;

        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = setup().await;

        let result = service
            .register(RegisterInput::new("", "a@b.com", "password123"))
            .await;
        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));

        let result = service
            .register(RegisterInput::new("ok", "not-an-email", "password123"))
            .await;
        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));

        let result = service
            .register(RegisterInput::new("ok", "a@b.com", "short"))
            .await;
        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let service = setup().await;
        let registered = service.register(register_input("alice")).await.unwrap();

        let (user, token) = service
            .login(LoginInput::new("alice", "password123"))
            .await
            .unwrap();
        assert_eq!(user.id, registered.id);

        let claims = verify_token(&JwtConfig::default(), &token).unwrap();
        assert_eq!(claims.user_id, registered.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_login_by_email() {
        let service = setup().await;
        service.register(register_input("bob")).await.unwrap();

        let result = service
            .login(LoginInput::new("bob@example.com", "password123"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = setup().await;
        service.register(register_input("carol")).await.unwrap();

        let result = service.login(LoginInput::new("carol", "wrong-password")).await;
        assert!(matches!(
            result,
            Err(UserServiceError::AuthenticationError(_))
        ));
    }

    #[tokio::test]
    async fn test_suspended_user_cannot_login() {
        let service = setup().await;
        let user = service.register(register_input("dave")).await.unwrap();

        service
            .admin_update(
                user.id,
                UpdateUserInput {
                    status: Some(UserStatus::Suspended),
                    ..UpdateUserInput::default()
                },
            )
            .await
            .unwrap();

        let result = service.login(LoginInput::new("dave", "password123")).await;
        assert!(matches!(
            result,
            Err(UserServiceError::AuthenticationError(_))
        ));
    }

    #[tokio::test]
    async fn test_change_password() {
        let service = setup().await;
        let user = service.register(register_input("erin")).await.unwrap();

        service
            .change_password(user.id, "password123", "new-password-1")
            .await
            .unwrap();

        assert!(service
            .login(LoginInput::new("erin", "password123"))
            .await
            .is_err());
        assert!(service
            .login(LoginInput::new("erin", "new-password-1"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_change_password_wrong_current() {
        let service = setup().await;
        let user = service.register(register_input("frank")).await.unwrap();

        let result = service
            .change_password(user.id, "wrong", "new-password-1")
            .await;
        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_cannot_delete_last_admin() {
        let service = setup().await;
        let admin = service.register(register_input("root")).await.unwrap();

        let result = service.admin_delete(admin.id).await;
        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));

        // A member can be removed
        let member = service.register(register_input("member")).await.unwrap();
        service.admin_delete(member.id).await.unwrap();
    }
}
