//! Session token utilities using HS256.
//!
//! The session cookie carries a signed token whose subject is the member id
//! (the identity provider's stable user id). Tokens are verified on every
//! request; nothing the client sends is trusted without a valid signature.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Minimum accepted secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Error type for session token operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (member id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Token id
    pub jti: String,
}

/// Signing configuration for session tokens.
#[derive(Clone)]
pub struct SessionTokenConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Session lifetime in seconds
    pub ttl_secs: i64,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for SessionTokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenConfig")
            .field("ttl_secs", &self.ttl_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl SessionTokenConfig {
    /// Creates a config from a shared secret.
    pub fn new(secret: &str, ttl_secs: i64) -> Result<Self, JwtError> {
        Self::with_leeway(secret, ttl_secs, DEFAULT_LEEWAY_SECS)
    }

    /// Creates a config from a shared secret with custom leeway.
    pub fn with_leeway(secret: &str, ttl_secs: i64, leeway_secs: u64) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::InvalidKey(format!(
                "Session secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
            leeway_secs,
        })
    }

    /// Issues a session token for the given member. Returns `(token, jti)`.
    pub fn issue(&self, member_id: &str) -> Result<(String, String), JwtError> {
        if member_id.is_empty() {
            return Err(JwtError::EncodingError("Empty subject".to_string()));
        }

        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();
        let claims = Claims {
            sub: member_id.to_string(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok((token, jti))
    }

    /// Verifies a token's signature and expiry and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        if token_data.claims.sub.is_empty() {
            return Err(JwtError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_for_session_testing_12345";

    fn create_test_config() -> SessionTokenConfig {
        SessionTokenConfig::with_leeway(SECRET, 3600, 0).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let config = create_test_config();
        let (token, jti) = config.issue("google-uid-123").unwrap();

        assert!(token.contains('.'), "JWT should have dots separating parts");
        let claims = config.verify(&token).unwrap();
        assert_eq!(claims.sub, "google-uid-123");
        assert_eq!(claims.jti, jti);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = SessionTokenConfig::new("short", 3600);
        assert!(matches!(result, Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn test_empty_subject_rejected() {
        let config = create_test_config();
        assert!(config.issue("").is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let config = create_test_config();
        let other =
            SessionTokenConfig::with_leeway("another_secret_that_is_long_enough_000", 3600, 0)
                .unwrap();
        let (token, _) = other.issue("uid").unwrap();

        assert!(matches!(config.verify(&token), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        let config = SessionTokenConfig::with_leeway(SECRET, -120, 0).unwrap();
        let (token, _) = config.issue("uid").unwrap();

        let result = config.verify(&token);
        assert!(
            matches!(result, Err(JwtError::TokenExpired)),
            "Expected TokenExpired, got: {:?}",
            result
        );
    }

    #[test]
    fn test_malformed_token() {
        let config = create_test_config();
        assert!(config.verify("not_a_jwt").is_err());
        assert!(config.verify("invalid.token.here").is_err());
    }

    #[test]
    fn test_unique_jti_per_token() {
        let config = create_test_config();
        let (_, jti1) = config.issue("uid").unwrap();
        let (_, jti2) = config.issue("uid").unwrap();
        assert_ne!(jti1, jti2);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let debug = format!("{:?}", create_test_config());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(SECRET));
    }
}
