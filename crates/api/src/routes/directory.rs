//! Member directory routes.
//!
//! Only approved members are listed. Contact fields are redacted unless the
//! viewer is an administrator, the member themself, or an accepted connection.

use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::member::{DirectoryEntry, DirectoryQuery, Member};
use domain::services::directory::{can_view_contact, to_directory_entry, Viewer};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ApprovedMember;

/// Search the directory.
///
/// GET /api/v1/directory?search=&industry=
pub async fn search(
    State(state): State<AppState>,
    ApprovedMember(viewer): ApprovedMember,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Vec<DirectoryEntry>>, ApiError> {
    let rows = state
        .members
        .search_directory(query.search.as_deref(), query.industry.as_deref())
        .await?;

    let connected: HashSet<String> = if viewer.is_admin() {
        HashSet::new()
    } else {
        state
            .connections
            .connected_member_ids(&viewer.id)
            .await?
            .into_iter()
            .collect()
    };

    let who = Viewer {
        member_id: &viewer.id,
        is_admin: viewer.is_admin(),
    };
    let entries = rows
        .into_iter()
        .map(|row| {
            let member: Member = row.into();
            let visible = can_view_contact(who, &member.id, connected.contains(&member.id));
            to_directory_entry(member, visible)
        })
        .collect();

    Ok(Json(entries))
}

/// Get one directory entry.
///
/// GET /api/v1/directory/:member_id
pub async fn get_entry(
    State(state): State<AppState>,
    ApprovedMember(viewer): ApprovedMember,
    Path(member_id): Path<String>,
) -> Result<Json<DirectoryEntry>, ApiError> {
    let member: Member = state
        .members
        .find_by_id(&member_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    // Unapproved profiles are not part of the directory.
    if !member.is_approved() && !viewer.is_admin() && member.id != viewer.id {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }

    let connected = if viewer.is_admin() || member.id == viewer.id {
        false
    } else {
        state.connections.is_connected(&viewer.id, &member.id).await?
    };

    let who = Viewer {
        member_id: &viewer.id,
        is_admin: viewer.is_admin(),
    };
    let visible = can_view_contact(who, &member.id, connected);
    Ok(Json(to_directory_entry(member, visible)))
}
