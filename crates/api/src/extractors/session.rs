//! Extractors for the signed-in member.
//!
//! They read the member loaded by the session middleware, so handlers using
//! them must sit behind `require_session`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Member;

use crate::error::ApiError;
use crate::middleware::session::CurrentMember;

fn current(parts: &Parts) -> Result<Member, ApiError> {
    parts
        .extensions
        .get::<CurrentMember>()
        .map(|c| c.0.clone())
        .ok_or_else(|| ApiError::Unauthorized("Please sign in".to_string()))
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentMember {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current(parts).map(CurrentMember)
    }
}

/// An approved member, or an administrator.
#[derive(Debug, Clone)]
pub struct ApprovedMember(pub Member);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ApprovedMember {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let member = current(parts)?;
        if member.is_approved() || member.is_admin() {
            Ok(ApprovedMember(member))
        } else {
            Err(ApiError::Forbidden(
                "Your profile must be approved to access this feature".to_string(),
            ))
        }
    }
}

/// A member with the admin role.
#[derive(Debug, Clone)]
pub struct AdminMember(pub Member);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminMember {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let member = current(parts)?;
        if member.is_admin() {
            Ok(AdminMember(member))
        } else {
            Err(ApiError::Forbidden("Administrator access required".to_string()))
        }
    }
}
