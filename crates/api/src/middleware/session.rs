//! Session authentication middleware.
//!
//! The session token names a member id; the member record (and with it the
//! role) is loaded from storage on every request.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::Member;

use crate::app::AppState;
use crate::error::ApiError;

/// The signed-in member, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct CurrentMember(pub Member);

/// Resolves the session token to a member record.
pub async fn authenticate(state: &AppState, token: Option<&str>) -> Result<Member, ApiError> {
    let token = token.ok_or_else(|| ApiError::Unauthorized("Please sign in".to_string()))?;

    let claims = state.sessions.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Session token rejected");
        ApiError::Unauthorized("Session expired or invalid".to_string())
    })?;

    let member = state
        .members
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(member.into())
}

/// Rejects requests without a valid session.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = state.session_cookie.extract_token(req.headers());
    match authenticate(&state, token).await {
        Ok(member) => {
            req.extensions_mut().insert(CurrentMember(member));
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Rejects signed-in members without the admin role. Runs after
/// [`require_session`].
pub async fn require_admin(req: Request<Body>, next: Next) -> Response {
    match req.extensions().get::<CurrentMember>() {
        Some(CurrentMember(member)) if member.is_admin() => next.run(req).await,
        Some(CurrentMember(member)) => {
            tracing::warn!(member_id = %member.id, "Non-admin attempted admin route");
            ApiError::Forbidden("Administrator access required".to_string()).into_response()
        }
        None => ApiError::Unauthorized("Please sign in".to_string()).into_response(),
    }
}
