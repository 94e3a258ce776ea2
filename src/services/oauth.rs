//! Google OAuth login
//!
//! Exchanges an authorization code for Google tokens, fetches the user's
//! profile, and logs in (or registers) the matching local account,
//! issuing a regular bearer token. OAuth stays disabled until client
//! credentials are configured.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;

use crate::config::{GoogleOauthConfig, JwtConfig};
use crate::db::repositories::UserRepository;
use crate::models::{User, UserRole};
use crate::services::password::hash_password;
use crate::services::token;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Error types for OAuth operations
#[derive(Debug, thiserror::Error)]
pub enum OauthServiceError {
    /// Client credentials are not configured
    #[error("OAuth login is not configured")]
    Disabled,

    /// The provider rejected the code exchange
    #[error("OAuth exchange failed: {0}")]
    ExchangeFailed(String),

    /// The provider account is unusable (no verified email)
    #[error("OAuth account has no verified email")]
    NoVerifiedEmail,

    /// The matching local account cannot log in
    #[error("Account is suspended")]
    Suspended,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Token response from the provider
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Userinfo response from the provider
#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
}

/// Google OAuth service
pub struct OauthService {
    config: GoogleOauthConfig,
    jwt: JwtConfig,
    user_repo: Arc<dyn UserRepository>,
    client: reqwest::Client,
}

impl OauthService {
    /// Create a new OAuth service
    pub fn new(
        config: GoogleOauthConfig,
        jwt: JwtConfig,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            config,
            jwt,
            user_repo,
            client: reqwest::Client::new(),
        }
    }

    /// Whether OAuth login is available
    pub fn is_enabled(&self) -> bool {
        self.config.is_configured()
    }

    /// Build the authorization URL the frontend redirects the user to
    pub fn authorize_url(&self, state: &str) -> Result<String, OauthServiceError> {
        if !self.is_enabled() {
            return Err(OauthServiceError::Disabled);
        }

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope=openid%20email%20profile&state={}",
            GOOGLE_AUTH_URL,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(state),
        ))
    }

    /// Complete the flow: exchange the code, fetch the profile, and log
    /// in or register the matching local account. Returns the user and
    /// a signed bearer token.
    pub async fn login_with_code(&self, code: &str) -> Result<(User, String), OauthServiceError> {
        if !self.is_enabled() {
            return Err(OauthServiceError::Disabled);
        }

        let tokens = self.exchange_code(code).await?;
        let info = self.fetch_userinfo(&tokens.access_token).await?;

        let email = match (info.email, info.email_verified) {
            (Some(email), Some(true)) => email,
            _ => return Err(OauthServiceError::NoVerifiedEmail),
        };

        let user = match self
            .user_repo
            .get_by_email(&email)
            .await
            .context("Failed to look up user by email")?
        {
            Some(user) => user,
            None => self.register_from_profile(&email, info.name.as_deref()).await?,
        };

        if user.is_suspended() {
            return Err(OauthServiceError::Suspended);
        }

        let bearer = token::issue_token(&self.jwt, &user)
            .map_err(|e| OauthServiceError::InternalError(anyhow::anyhow!(e)))?;

        Ok((user, bearer))
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OauthServiceError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .context("Token exchange request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OauthServiceError::ExchangeFailed(format!(
                "{}: {}",
                status, body
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .context("Failed to decode token response")
            .map_err(Into::into)
    }

    async fn fetch_userinfo(&self, access_token: &str) -> Result<UserInfo, OauthServiceError> {
        let response = self
            .client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .context("Userinfo request failed")?;

        if !response.status().is_success() {
            return Err(OauthServiceError::ExchangeFailed(format!(
                "userinfo: {}",
                response.status()
            )));
        }

        response
            .json::<UserInfo>()
            .await
            .context("Failed to decode userinfo response")
            .map_err(Into::into)
    }

    /// Create a local account for a first-time OAuth login. The password
    /// is random and unusable; such accounts authenticate via OAuth.
    async fn register_from_profile(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> Result<User, OauthServiceError> {
        let base = name
            .map(derive_username)
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| {
                email
                    .split('@')
                    .next()
                    .map(derive_username)
                    .unwrap_or_default()
            });
        let base = if base.is_empty() { "user".to_string() } else { base };

        // Usernames are unique; suffix until one is free
        let mut username = base.clone();
        let mut attempt = 1;
        while self
            .user_repo
            .get_by_username(&username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            attempt += 1;
            username = format!("{}{}", base, attempt);
        }

        let placeholder = hash_password(&uuid::Uuid::new_v4().to_string())
            .context("Failed to hash placeholder password")?;

        let is_first = self
            .user_repo
            .count()
            .await
            .context("Failed to count users")?
            == 0;
        let role = if is_first {
            UserRole::Admin
        } else {
            UserRole::Member
        };

        self.user_repo
            .create(&User::new(username, email.to_string(), placeholder, role))
            .await
            .context("Failed to create user from OAuth profile")
            .map_err(Into::into)
    }
}

/// Reduce a display name to a username-safe string
fn derive_username(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .take(30)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxUserRepository;
    use crate::db::{create_test_pool, migrations};

    async fn service(configured: bool) -> OauthService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let config = if configured {
            GoogleOauthConfig {
                client_id: "client-id".to_string(),
                client_secret: "client-secret".to_string(),
                redirect_uri: "http://localhost:3000/oauth/callback".to_string(),
            }
        } else {
            GoogleOauthConfig::default()
        };

        OauthService::new(config, JwtConfig::default(), SqlxUserRepository::shared(pool))
    }

    #[test]
    fn test_derive_username() {
        assert_eq!(derive_username("Jane Doe"), "janedoe");
        assert_eq!(derive_username("!!!"), "");
        assert_eq!(derive_username("Ada L. 42"), "adal42");
    }

    #[tokio::test]
    async fn test_disabled_until_configured() {
        let service = service(false).await;
        assert!(!service.is_enabled());
        assert!(matches!(
            service.authorize_url("xyz"),
            Err(OauthServiceError::Disabled)
        ));
        assert!(matches!(
            service.login_with_code("code").await,
            Err(OauthServiceError::Disabled)
        ));
    }

    #[tokio::test]
    async fn test_authorize_url_contains_client_and_state() {
        let service = service(true).await;
        let url = service.authorize_url("state-123").unwrap();

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("state=state-123"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Foauth%2Fcallback"));
    }

    #[tokio::test]
    async fn test_register_from_profile_unique_usernames() {
        let service = service(true).await;

        let first = service
            .register_from_profile("jane@example.com", Some("Jane Doe"))
            .await
            .unwrap();
        assert_eq!(first.username, "janedoe");
        // First account on a fresh install is the admin
        assert_eq!(first.role, UserRole::Admin);

        let second = service
            .register_from_profile("jane2@example.com", Some("Jane Doe"))
            .await
            .unwrap();
        assert_eq!(second.username, "janedoe2");
        assert_eq!(second.role, UserRole::Member);
    }
}
