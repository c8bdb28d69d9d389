//! Administrator routes: profile review, member removal and export.
//!
//! These routes sit behind `require_admin`; the role is read from storage on
//! every request.

use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use domain::models::admin::{
    AdminMemberQuery, BulkDecisionRequest, BulkDecisionResponse, ReviewDecision,
};
use domain::models::member::{Member, MemberStatus};
use domain::services::export::members_to_csv;
use domain::services::lifecycle::check_review;
use domain::services::notification::{deliver, review_decided, MailMessage};
use tracing::{info, warn};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminMember, ValidJson};
use crate::middleware::metrics::{record_email_result, record_member_transition};

/// List members, newest first, optionally filtered by status.
///
/// GET /api/v1/admin/members?status=
pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<AdminMemberQuery>,
) -> Result<Json<Vec<Member>>, ApiError> {
    let members = state
        .members
        .list(query.status)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(members))
}

/// Profiles waiting for review.
///
/// GET /api/v1/admin/members/pending
pub async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<Vec<Member>>, ApiError> {
    list_members(
        State(state),
        Query(AdminMemberQuery {
            status: Some(MemberStatus::Pending),
        }),
    )
    .await
}

/// Applies one review decision: status change, in-app notification and email.
///
/// Only the status change can fail the call. The notification and email are
/// sent after it is stored, and their failures are logged.
async fn decide(
    state: &AppState,
    admin: &Member,
    member_id: &str,
    decision: ReviewDecision,
) -> Result<Member, ApiError> {
    let member: Member = state
        .members
        .find_by_id(member_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    let target = check_review(&member, decision)?;

    if !state
        .members
        .set_review_status(&member.id, target, Utc::now())
        .await?
    {
        return Err(ApiError::Conflict(
            "Member is no longer pending review".to_string(),
        ));
    }

    record_member_transition(target);
    info!(
        member_id = %member.id,
        admin_id = %admin.id,
        status = %target,
        "Member review decided"
    );

    if let Err(e) = state
        .notifications
        .create(&review_decided(&member.id, decision))
        .await
    {
        warn!(member_id = %member.id, error = %e, "Failed to store review notification");
    }

    let opted_in = match state.settings.email_opt_in(&member.id).await {
        Ok(opted_in) => opted_in,
        Err(e) => {
            warn!(member_id = %member.id, error = %e, "Failed to read email preference");
            false
        }
    };
    let link = format!(
        "{}/profile",
        state.config.server.app_base_url.trim_end_matches('/')
    );
    let message = MailMessage::review_decision(
        member.email(),
        member.display_name(),
        decision,
        &link,
    );
    let result = deliver(state.mailer.as_ref(), message, opted_in).await;
    record_email_result(&result);

    state
        .members
        .find_by_id(&member.id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))
}

/// Approve a pending profile.
///
/// POST /api/v1/admin/members/:id/approve
pub async fn approve(
    State(state): State<AppState>,
    AdminMember(admin): AdminMember,
    Path(id): Path<String>,
) -> Result<Json<Member>, ApiError> {
    decide(&state, &admin, &id, ReviewDecision::Approve)
        .await
        .map(Json)
}

/// Reject a pending profile. The member may edit and resubmit.
///
/// POST /api/v1/admin/members/:id/reject
pub async fn reject(
    State(state): State<AppState>,
    AdminMember(admin): AdminMember,
    Path(id): Path<String>,
) -> Result<Json<Member>, ApiError> {
    decide(&state, &admin, &id, ReviewDecision::Reject)
        .await
        .map(Json)
}

/// Applies a decision to each member in turn.
///
/// Members that are missing or not pending are reported as skipped.
/// Infrastructure failures stop the batch.
async fn decide_bulk(
    state: &AppState,
    admin: &Member,
    request: BulkDecisionRequest,
    decision: ReviewDecision,
) -> Result<BulkDecisionResponse, ApiError> {
    let mut response = BulkDecisionResponse::default();
    let mut seen = HashSet::new();

    for member_id in request.member_ids.iter().map(|id| id.trim()) {
        if member_id.is_empty() || !seen.insert(member_id.to_string()) {
            continue;
        }
        match decide(state, admin, member_id, decision).await {
            Ok(_) => response.push_processed(member_id),
            Err(ApiError::NotFound(reason)) | Err(ApiError::Conflict(reason)) => {
                response.push_skipped(member_id, reason)
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        admin_id = %admin.id,
        processed = response.processed,
        skipped = response.skipped,
        "Bulk review completed"
    );

    Ok(response)
}

/// POST /api/v1/admin/members/bulk-approve
pub async fn bulk_approve(
    State(state): State<AppState>,
    AdminMember(admin): AdminMember,
    ValidJson(request): ValidJson<BulkDecisionRequest>,
) -> Result<Json<BulkDecisionResponse>, ApiError> {
    decide_bulk(&state, &admin, request, ReviewDecision::Approve)
        .await
        .map(Json)
}

/// POST /api/v1/admin/members/bulk-reject
pub async fn bulk_reject(
    State(state): State<AppState>,
    AdminMember(admin): AdminMember,
    ValidJson(request): ValidJson<BulkDecisionRequest>,
) -> Result<Json<BulkDecisionResponse>, ApiError> {
    decide_bulk(&state, &admin, request, ReviewDecision::Reject)
        .await
        .map(Json)
}

/// Delete a member and everything that references them.
///
/// DELETE /api/v1/admin/members/:id
pub async fn delete_member(
    State(state): State<AppState>,
    AdminMember(admin): AdminMember,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if id == admin.id {
        return Err(ApiError::Conflict(
            "Use account deletion to remove your own account".to_string(),
        ));
    }

    if !state.members.delete_cascade(&id).await? {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }

    info!(member_id = %id, admin_id = %admin.id, "Member deleted by administrator");

    Ok(StatusCode::NO_CONTENT)
}

/// Export all member profiles as CSV.
///
/// GET /api/v1/admin/members/export.csv
pub async fn export_csv(
    State(state): State<AppState>,
    AdminMember(admin): AdminMember,
) -> Result<impl IntoResponse, ApiError> {
    let members: Vec<Member> = state
        .members
        .list(None)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let csv = members_to_csv(&members);
    let filename = format!("members-{}.csv", Utc::now().format("%Y-%m-%d"));

    info!(admin_id = %admin.id, rows = members.len(), "Member export generated");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    ))
}
