//! Session routes: sign-in with an identity token, and sign-out.

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use chrono::{DateTime, Duration, Utc};
use domain::models::member::{Member, MemberRole, NewMember};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidJson;
use crate::middleware::metrics::record_member_created;

/// Request body for `POST /api/v1/auth/session`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[validate(length(min = 1, max = 4096, message = "An identity token is required"))]
    pub id_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub member: Member,
    /// True when this sign-in created the member record.
    pub created: bool,
    pub expires_at: DateTime<Utc>,
}

/// Sign in.
///
/// POST /api/v1/auth/session
///
/// Verifies the identity token, binds the identity to a member record
/// (creating it in draft status on first sign-in) and sets the session cookie.
pub async fn sign_in(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<SignInRequest>,
) -> Result<(StatusCode, HeaderMap, Json<SignInResponse>), ApiError> {
    let identity = state.identity.verify(&request.id_token).await?;

    let is_bootstrap_admin = state.config.admin.is_bootstrap_email(&identity.email);
    let new_member = NewMember {
        id: identity.subject.clone(),
        email: identity.email.clone(),
        full_name: identity.name.clone().unwrap_or_default(),
        profile_image_url: identity.picture.clone(),
        role: if is_bootstrap_admin {
            MemberRole::Admin
        } else {
            MemberRole::Member
        },
    };

    let (entity, created) = state
        .members
        .create_if_absent(&new_member, &state.config.membership.enrollment_prefix)
        .await?;
    let mut member: Member = entity.into();

    if created {
        record_member_created();
        info!(
            member_id = %member.id,
            enrollment_code = %member.personal_details.enrollment_code,
            "Member record created"
        );
    }

    // Bootstrap emails added after the record was created.
    if is_bootstrap_admin && !member.is_admin() && state.members.promote_to_admin(&member.id).await? {
        info!(member_id = %member.id, "Member promoted to administrator");
        member.role = MemberRole::Admin;
    }

    let (token, _jti) = state
        .sessions
        .issue(&member.id)
        .map_err(|e| ApiError::Internal(format!("Failed to issue session token: {}", e)))?;

    let mut headers = HeaderMap::new();
    state.session_cookie.set(&mut headers, &token);

    info!(member_id = %member.id, "Member signed in");

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        headers,
        Json(SignInResponse {
            member,
            created,
            expires_at: Utc::now() + Duration::seconds(state.sessions.ttl_secs),
        }),
    ))
}

/// Sign out.
///
/// DELETE /api/v1/auth/session
///
/// Clears the session cookie. Succeeds without a session.
pub async fn sign_out(State(state): State<AppState>) -> (StatusCode, HeaderMap) {
    let mut headers = HeaderMap::new();
    state.session_cookie.clear(&mut headers);
    (StatusCode::NO_CONTENT, headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_request_uses_camel_case() {
        let req: SignInRequest = serde_json::from_str(r#"{"idToken":"abc"}"#).unwrap();
        assert_eq!(req.id_token, "abc");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_token_fails_validation() {
        let req = SignInRequest {
            id_token: String::new(),
        };
        assert!(req.validate().is_err());
    }
}
