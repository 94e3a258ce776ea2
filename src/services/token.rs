//! Bearer token issuance and verification
//!
//! Tokens are HS256 JWTs signed with the configured symmetric key.
//! Verification checks signature, issuer, audience and expiry with zero
//! leeway, so a token expired by one second is already rejected.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::config::JwtConfig;
use crate::models::{User, UserRole};

/// JWT claim set carried by access tokens
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: user id
    sub: String,
    /// Username
    name: String,
    /// Role
    role: String,
    /// Issuer
    iss: String,
    /// Audience
    aud: String,
    /// Expiry (unix seconds)
    exp: usize,
}

/// Validated identity extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

/// Errors produced by token verification
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Token lifetime has passed
    #[error("Token expired")]
    Expired,

    /// Malformed token, bad signature, or issuer/audience mismatch
    #[error("Invalid token")]
    Invalid,

    /// Token could not be created
    #[error("Failed to issue token: {0}")]
    Issue(String),
}

/// Issue a signed access token for the user
pub fn issue_token(config: &JwtConfig, user: &User) -> Result<String, TokenError> {
    let exp = Utc::now() + Duration::hours(config.expiry_hours);

    let claims = Claims {
        sub: user.id.to_string(),
        name: user.username.clone(),
        role: user.role.to_string(),
        iss: config.issuer.clone(),
        aud: config.audience.clone(),
        exp: exp.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| TokenError::Issue(e.to_string()))
}

/// Verify a token and extract the identity it carries.
///
/// Signature, issuer, audience and expiry are all checked; clock-skew
/// tolerance is zero.
pub fn verify_token(config: &JwtConfig, token: &str) -> Result<AccessClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;

    let user_id = decoded
        .claims
        .sub
        .parse::<i64>()
        .map_err(|_| TokenError::Invalid)?;
    let role = UserRole::from_str(&decoded.claims.role).map_err(|_| TokenError::Invalid)?;

    if decoded.claims.name.is_empty() {
        return Err(TokenError::Invalid);
    }

    Ok(AccessClaims {
        user_id,
        username: decoded.claims.name,
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            issuer: "tubedesk".to_string(),
            audience: "tubedesk-frontend".to_string(),
            expiry_hours: 1,
        }
    }

    fn test_user() -> User {
        let mut user = User::new(
            "thor".to_string(),
            "thor@example.com".to_string(),
            "hash".to_string(),
            UserRole::Manager,
        );
        user.id = 17;
        user
    }

    /// Encode claims directly, bypassing issue_token, to control exp
    fn encode_claims(config: &JwtConfig, claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let config = test_config();
        let token = issue_token(&config, &test_user()).unwrap();
        assert!(!token.is_empty());

        let claims = verify_token(&config, &token).unwrap();
        assert_eq!(claims.user_id, 17);
        assert_eq!(claims.username, "thor");
        assert_eq!(claims.role, UserRole::Manager);
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = test_config();

        // Expired one second ago; zero leeway must reject it
        let claims = Claims {
            sub: "17".to_string(),
            name: "thor".to_string(),
            role: "manager".to_string(),
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            exp: (Utc::now() - Duration::seconds(1)).timestamp() as usize,
        };
        let token = encode_claims(&config, &claims);

        let result = verify_token(&config, &token);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let config = test_config();

        let claims = Claims {
            sub: "17".to_string(),
            name: "thor".to_string(),
            role: "manager".to_string(),
            iss: "someone-else".to_string(),
            aud: config.audience.clone(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        let token = encode_claims(&config, &claims);

        assert!(matches!(
            verify_token(&config, &token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let config = test_config();

        let claims = Claims {
            sub: "17".to_string(),
            name: "thor".to_string(),
            role: "manager".to_string(),
            iss: config.issuer.clone(),
            aud: "another-app".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        let token = encode_claims(&config, &claims);

        assert!(matches!(
            verify_token(&config, &token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = test_config();
        let token = issue_token(&config, &test_user()).unwrap();

        let other = JwtConfig {
            secret: "other-secret".to_string(),
            ..test_config()
        };

        assert!(matches!(
            verify_token(&other, &token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let config = test_config();
        assert!(matches!(
            verify_token(&config, "not.a.token"),
            Err(TokenError::Invalid)
        ));
    }
}
