//! In-app notification routes. Every operation is scoped to the caller.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::forum::FeedQuery;
use domain::models::notification::{MarkAllReadResponse, Notification, UnreadCountResponse};
use shared::pagination::{clamp_limit, decode_cursor, Page};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentMember;

/// List the caller's notifications, newest first.
///
/// GET /api/v1/notifications?cursor=&limit=
pub async fn list(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Page<Notification>>, ApiError> {
    let before = query.cursor.as_deref().map(decode_cursor).transpose()?;
    let limit = clamp_limit(query.limit);

    let rows = state.notifications.list(&member.id, before, limit).await?;
    let page = Page::from_overfetch(rows, limit, |n| (n.created_at, n.id)).map(Notification::from);

    Ok(Json(page))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let unread = state.notifications.unread_count(&member.id).await?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// Mark one of the caller's notifications read.
///
/// POST /api/v1/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.notifications.mark_read(id, &member.id).await? {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let updated = state.notifications.mark_all_read(&member.id).await?;
    tracing::debug!(member_id = %member.id, updated = updated, "Notifications marked read");
    Ok(Json(MarkAllReadResponse { updated }))
}
