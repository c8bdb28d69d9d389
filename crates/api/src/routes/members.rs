//! Routes for the signed-in member's own profile.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use domain::models::member::{Member, MemberStatus, UpdateProfileRequest};
use domain::models::settings::{MemberSettings, UpdateSettingsRequest};
use domain::services::lifecycle::{apply_update, check_submission};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidJson;
use crate::middleware::metrics::record_member_transition;
use crate::middleware::CurrentMember;

async fn reload(state: &AppState, id: &str) -> Result<Member, ApiError> {
    state
        .members
        .find_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))
}

/// Get the caller's profile.
///
/// GET /api/v1/members/me
pub async fn get_me(CurrentMember(member): CurrentMember) -> Json<Member> {
    Json(member)
}

/// Edit the caller's profile.
///
/// PUT /api/v1/members/me
///
/// Draft and rejected profiles are freely editable. Pending profiles are
/// locked, and approved profiles may be edited once per lock window.
pub async fn update_me(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
    ValidJson(request): ValidJson<UpdateProfileRequest>,
) -> Result<Json<Member>, ApiError> {
    if request.is_empty() {
        return Err(ApiError::Validation("No profile changes supplied".to_string()));
    }
    request.check()?;

    let now = Utc::now();
    state.policy.check_edit_allowed(&member, now)?;

    let updated = apply_update(&member, request, now);
    if !state.members.update_profile(&member, &updated).await? {
        return Err(ApiError::Conflict(
            "Profile changed while saving, please retry".to_string(),
        ));
    }

    info!(member_id = %member.id, status = %member.status, "Profile updated");

    Ok(Json(reload(&state, &member.id).await?))
}

/// Delete the caller's account and everything that references it.
///
/// DELETE /api/v1/members/me
pub async fn delete_me(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    if !state.members.delete_cascade(&member.id).await? {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }

    info!(member_id = %member.id, "Member deleted their account");

    let mut headers = HeaderMap::new();
    state.session_cookie.clear(&mut headers);
    Ok((StatusCode::NO_CONTENT, headers))
}

/// Submit the profile for review.
///
/// POST /api/v1/members/me/submit
///
/// Every requirement is checked before the status changes; the first unmet
/// one is reported by name.
pub async fn submit(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
) -> Result<Json<Member>, ApiError> {
    check_submission(&member)?;

    if !state.members.submit(&member, Utc::now()).await? {
        // The profile changed since it was loaded.
        let current = reload(&state, &member.id).await?;
        check_submission(&current)?;
        return Err(ApiError::Conflict(
            "Profile changed while submitting, please retry".to_string(),
        ));
    }

    record_member_transition(MemberStatus::Pending);
    info!(member_id = %member.id, "Profile submitted for review");

    Ok(Json(reload(&state, &member.id).await?))
}

/// Upload a profile image.
///
/// PUT /api/v1/members/me/avatar
///
/// The body is the raw image; `Content-Type` must be an image type.
pub async fn upload_avatar(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Member>, ApiError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::UnsupportedMediaType("Content-Type is required".to_string()))?;

    let now = Utc::now();
    state.policy.check_edit_allowed(&member, now)?;

    let url = state.images.store(&body, content_type).await?;

    if !state.members.set_profile_image(&member, &url, now).await? {
        return Err(ApiError::Conflict(
            "Profile changed while uploading, please retry".to_string(),
        ));
    }

    info!(member_id = %member.id, size = body.len(), "Profile image updated");

    Ok(Json(reload(&state, &member.id).await?))
}

/// Get the caller's settings.
///
/// GET /api/v1/members/me/settings
pub async fn get_settings(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
) -> Result<Json<MemberSettings>, ApiError> {
    let settings = state
        .settings
        .find(&member.id)
        .await?
        .map(Into::into)
        .unwrap_or_else(|| MemberSettings::defaults_for(&member.id));
    Ok(Json(settings))
}

/// Update the caller's settings.
///
/// PUT /api/v1/members/me/settings
pub async fn update_settings(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
    ValidJson(request): ValidJson<UpdateSettingsRequest>,
) -> Result<Json<MemberSettings>, ApiError> {
    let Some(email_notifications) = request.email_notifications else {
        return get_settings(State(state), CurrentMember(member)).await;
    };

    let saved = state
        .settings
        .upsert(&member.id, email_notifications)
        .await?;

    info!(
        member_id = %member.id,
        email_notifications = email_notifications,
        "Member settings updated"
    );

    Ok(Json(saved.into()))
}
