//! JWT Token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::shared::InfraError;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: i64, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
            issuer: issuer.into(),
        }
    }
}

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user uuid)
    pub sub: String,
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
}

impl TokenClaims {
    /// Fails when `expiration_hours` does not fit a timestamp.
    pub fn new(user_id: &str, email: &str, config: &JwtConfig) -> Result<Self, InfraError> {
        let now = Utc::now();
        let exp = Duration::try_hours(config.expiration_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(InfraError::TokenLifetime(config.expiration_hours))?;

        Ok(Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        })
    }
}

/// Sign an HS256 token for a user
pub fn create_token(user_id: &str, email: &str, config: &JwtConfig) -> Result<String, InfraError> {
    let claims = TokenClaims::new(user_id, email, config)?;

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verify signature, expiry and issuer, then return the claims
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig::new("test-secret", 24, "users-service")
    }

    #[test]
    fn test_create_and_verify_token() {
        let config = config();
        let token = create_token("user-123", "a@x.com", &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_invalid_token() {
        assert!(verify_token("invalid-token", &config()).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token("user-123", "a@x.com", &config()).unwrap();
        let other = JwtConfig::new("another-secret", 24, "users-service");
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = config();
        let now = Utc::now();
        let claims = TokenClaims {
            sub: "user-123".into(),
            email: "a@x.com".into(),
            exp: (now - Duration::hours(2)).timestamp(),
            iat: (now - Duration::hours(26)).timestamp(),
            iss: config.issuer.clone(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        let err = verify_token(&token, &config).unwrap_err();
        assert!(matches!(
            err.kind(),
            jsonwebtoken::errors::ErrorKind::ExpiredSignature
        ));
    }

    #[test]
    fn out_of_range_lifetime_is_an_error() {
        for hours in [i64::MAX, i64::MIN] {
            let config = JwtConfig::new("test-secret", hours, "users-service");
            let err = create_token("user-123", "a@x.com", &config).unwrap_err();
            assert!(matches!(err, InfraError::TokenLifetime(h) if h == hours));
        }
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let token = create_token("user-123", "a@x.com", &config()).unwrap();
        let other = JwtConfig::new("test-secret", 24, "someone-else");
        assert!(verify_token(&token, &other).is_err());
    }
}
