//! Forum routes: announcement posts by administrators, comments by members.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::forum::{
    CreateCommentRequest, CreatePostRequest, FeedQuery, ForumComment, ForumPost, PostWithComments,
};
use domain::services::notification::comment_added;
use persistence::repositories::NewPost;
use shared::pagination::{clamp_limit, decode_cursor, Page};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminMember, ApprovedMember, ValidJson};
use crate::middleware::metrics::record_notifications_fanned_out;

async fn load_post(state: &AppState, id: Uuid) -> Result<ForumPost, ApiError> {
    state
        .forum
        .find_post(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))
}

/// List posts, newest first.
///
/// GET /api/v1/forum/posts?cursor=&limit=
pub async fn list_posts(
    State(state): State<AppState>,
    ApprovedMember(_member): ApprovedMember,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Page<ForumPost>>, ApiError> {
    let before = query.cursor.as_deref().map(decode_cursor).transpose()?;
    let limit = clamp_limit(query.limit);

    let rows = state.forum.list_posts(before, limit).await?;
    let page = Page::from_overfetch(rows, limit, |p| (p.created_at, p.id)).map(ForumPost::from);

    Ok(Json(page))
}

/// Get a post with its comments.
///
/// GET /api/v1/forum/posts/:id
pub async fn get_post(
    State(state): State<AppState>,
    ApprovedMember(_member): ApprovedMember,
    Path(id): Path<Uuid>,
) -> Result<Json<PostWithComments>, ApiError> {
    let post = load_post(&state, id).await?;
    let comments = state
        .forum
        .list_comments(id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(PostWithComments { post, comments }))
}

/// Comment on a post.
///
/// POST /api/v1/forum/posts/:id/comments
///
/// The post author is notified unless they wrote the comment.
pub async fn add_comment(
    State(state): State<AppState>,
    ApprovedMember(member): ApprovedMember,
    Path(post_id): Path<Uuid>,
    ValidJson(request): ValidJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ForumComment>), ApiError> {
    let body = request.body.trim();
    if body.is_empty() {
        return Err(ApiError::Validation("Comment cannot be empty".to_string()));
    }

    let post = load_post(&state, post_id).await?;
    let notify = (post.author_id != member.id).then(|| comment_added(&post, member.display_name()));

    let comment = state
        .forum
        .add_comment(post_id, &member.id, body, notify.as_ref())
        .await?;

    info!(post_id = %post_id, comment_id = %comment.id, author_id = %member.id, "Comment added");

    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// Delete a comment. Allowed for its author and administrators.
///
/// DELETE /api/v1/forum/comments/:id
pub async fn delete_comment(
    State(state): State<AppState>,
    ApprovedMember(member): ApprovedMember,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let comment = state
        .forum
        .find_comment(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    if comment.author_id != member.id && !member.is_admin() {
        return Err(ApiError::Forbidden(
            "You can only delete your own comments".to_string(),
        ));
    }

    if !state.forum.delete_comment(id).await? {
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }

    info!(comment_id = %id, member_id = %member.id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Publish a post and notify every approved member.
///
/// POST /api/v1/admin/forum/posts
pub async fn create_post(
    State(state): State<AppState>,
    AdminMember(admin): AdminMember,
    ValidJson(request): ValidJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<ForumPost>), ApiError> {
    request.check()?;

    let links = request.cleaned_links();
    let new_post = NewPost {
        title: request.title.trim(),
        body: request.body.trim(),
        links: &links,
        author_id: &admin.id,
        author_name: admin.display_name(),
    };

    let (post, notified) = state.forum.create_post_with_fanout(&new_post).await?;
    record_notifications_fanned_out(notified);

    info!(post_id = %post.id, author_id = %admin.id, notified = notified, "Forum post published");

    Ok((StatusCode::CREATED, Json(post.into())))
}

/// Delete a post and its comments.
///
/// DELETE /api/v1/admin/forum/posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.forum.delete_post(id).await? {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    info!(post_id = %id, "Forum post deleted");

    Ok(StatusCode::NO_CONTENT)
}
