//! Connection request routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::connection::{
    Connection, ConnectionStatus, ConnectionStatusResponse, SendConnectionRequest,
};
use domain::models::member::Member;
use domain::services::connections::{check_new_request, check_response, state_for};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApprovedMember, ValidJson};

/// List the caller's pending and accepted connections.
///
/// GET /api/v1/connections
pub async fn list_connections(
    State(state): State<AppState>,
    ApprovedMember(member): ApprovedMember,
) -> Result<Json<Vec<Connection>>, ApiError> {
    let connections = state
        .connections
        .list_for_member(&member.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(connections))
}

/// Send a connection request.
///
/// POST /api/v1/connections
///
/// A pair of members has at most one request, whichever side sent it.
pub async fn send_request(
    State(state): State<AppState>,
    ApprovedMember(member): ApprovedMember,
    ValidJson(request): ValidJson<SendConnectionRequest>,
) -> Result<(StatusCode, Json<Connection>), ApiError> {
    let target: Member = state
        .members
        .find_by_id(&request.target_member_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    let existing: Option<Connection> = state
        .connections
        .find_between(&member.id, &target.id)
        .await?
        .map(Into::into);
    check_new_request(&member, &target, existing.as_ref())?;

    let created = state
        .connections
        .create_request(&member, &target)
        .await
        .map_err(|e| match ApiError::from(e) {
            // Lost a race with a request for the same pair.
            ApiError::Conflict(_) => ApiError::Conflict(
                "A connection request already exists between these members".to_string(),
            ),
            other => other,
        })?;

    info!(
        connection_id = %created.id,
        from = %member.id,
        to = %target.id,
        "Connection requested"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn respond(
    state: &AppState,
    member: &Member,
    id: Uuid,
    status: ConnectionStatus,
) -> Result<Connection, ApiError> {
    let conn: Connection = state
        .connections
        .find_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Connection request not found".to_string()))?;

    check_response(&conn, &member.id)?;

    let updated = state
        .connections
        .respond(id, &member.id, status)
        .await?
        .ok_or_else(|| ApiError::Conflict("Connection request is no longer pending".to_string()))?;

    info!(connection_id = %id, member_id = %member.id, status = %status, "Connection request answered");

    Ok(updated.into())
}

/// Accept a request addressed to the caller.
///
/// POST /api/v1/connections/:id/accept
pub async fn accept(
    State(state): State<AppState>,
    ApprovedMember(member): ApprovedMember,
    Path(id): Path<Uuid>,
) -> Result<Json<Connection>, ApiError> {
    respond(&state, &member, id, ConnectionStatus::Accepted)
        .await
        .map(Json)
}

/// Reject a request addressed to the caller.
///
/// POST /api/v1/connections/:id/reject
pub async fn reject(
    State(state): State<AppState>,
    ApprovedMember(member): ApprovedMember,
    Path(id): Path<Uuid>,
) -> Result<Json<Connection>, ApiError> {
    respond(&state, &member, id, ConnectionStatus::Rejected)
        .await
        .map(Json)
}

/// Relationship between the caller and another member.
///
/// GET /api/v1/connections/status/:member_id
pub async fn status_with(
    State(state): State<AppState>,
    ApprovedMember(member): ApprovedMember,
    Path(other_id): Path<String>,
) -> Result<Json<ConnectionStatusResponse>, ApiError> {
    let conn: Option<Connection> = state
        .connections
        .find_between(&member.id, &other_id)
        .await?
        .map(Into::into);

    Ok(Json(ConnectionStatusResponse {
        state: state_for(conn.as_ref(), &member.id),
        connection_id: conn.map(|c| c.id),
    }))
}
