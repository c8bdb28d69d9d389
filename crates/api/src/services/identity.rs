//! Identity provider verification.
//!
//! Sign-in trades a Google ID token for a verified identity: the stable
//! subject id becomes the member id, and the email is trusted only when the
//! member record is first created.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::config::IdentityConfig;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid identity token")]
    InvalidToken,

    #[error("Identity token was issued for another application")]
    AudienceMismatch,

    #[error("Please login with a verified email address")]
    EmailNotVerified,

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// A verified identity returned by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError>;
}

/// Google `tokeninfo` response.
#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    sub: String,
    aud: Option<String>,
    email: Option<String>,
    #[serde(default, deserialize_with = "bool_or_string")]
    email_verified: bool,
    name: Option<String>,
    picture: Option<String>,
}

/// tokeninfo encodes booleans as strings.
fn bool_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => s.eq_ignore_ascii_case("true"),
    })
}

/// Verifies Google ID tokens against the tokeninfo endpoint.
pub struct GoogleIdentityProvider {
    client: reqwest::Client,
    tokeninfo_url: String,
    client_id: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(config: &IdentityConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_default();
        let client_id = Some(config.google_client_id.trim().to_string()).filter(|c| !c.is_empty());
        if client_id.is_none() {
            tracing::warn!("Google client ID not configured - audience validation skipped");
        }
        Self {
            client,
            tokeninfo_url: config.tokeninfo_url.clone(),
            client_id,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(IdentityError::Unavailable(format!("tokeninfo returned {}", status)));
        }
        if !status.is_success() {
            return Err(IdentityError::InvalidToken);
        }

        let info: GoogleTokenInfo = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("Malformed tokeninfo response: {}", e)))?;

        identity_from_token_info(info, self.client_id.as_deref())
    }
}

fn identity_from_token_info(
    info: GoogleTokenInfo,
    expected_audience: Option<&str>,
) -> Result<VerifiedIdentity, IdentityError> {
    if let Some(expected) = expected_audience {
        let actual = info.aud.as_deref().unwrap_or_default();
        if actual != expected {
            tracing::warn!(expected = %expected, actual = %actual, "Google token audience mismatch");
            return Err(IdentityError::AudienceMismatch);
        }
    }

    if info.sub.trim().is_empty() {
        return Err(IdentityError::InvalidToken);
    }

    let email = info
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or(IdentityError::EmailNotVerified)?;
    if !info.email_verified {
        return Err(IdentityError::EmailNotVerified);
    }

    Ok(VerifiedIdentity {
        subject: info.sub,
        email,
        name: info.name.filter(|n| !n.trim().is_empty()),
        picture: info.picture.filter(|p| !p.trim().is_empty()),
    })
}

/// Provider that resolves tokens from a fixed table. Used by tests and
/// local development without network access.
#[derive(Debug, Default, Clone)]
pub struct StaticIdentityProvider {
    identities: HashMap<String, VerifiedIdentity>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` as resolving to the given identity.
    pub fn with_identity(mut self, token: &str, subject: &str, email: &str, name: Option<&str>) -> Self {
        self.identities.insert(
            token.to_string(),
            VerifiedIdentity {
                subject: subject.to_string(),
                email: email.to_lowercase(),
                name: name.map(str::to_string),
                picture: None,
            },
        );
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        self.identities
            .get(id_token)
            .cloned()
            .ok_or(IdentityError::InvalidToken)
    }
}
